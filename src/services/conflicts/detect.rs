//! 评语冲突检测
//!
//! 批改完成后在快照上离线运行：同一练习内所有已完成结果的带引用
//! 评语两两比较，文本块相似且评分或评语不一致的配对被记为冲突。
//! 检测不持有任何锁，结果写入时由唯一索引去重。

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::models::assessments::entities::{Feedback, TextBlock};
use crate::models::conflicts::entities::ConflictKind;
use crate::models::exercises::entities::{Exercise, ExerciseKind};
use crate::storage::{NewConflict, Storage};

/// 练习是否参与冲突检测
///
/// 仅限启用了自动批改的文本练习；其他类型没有可比较的文本块，
/// 未启用自动批改的练习不做自动分析。
pub fn should_detect(exercise: &Exercise) -> bool {
    exercise.kind == ExerciseKind::Text && exercise.automatic_assessment_enabled
}

/// 文本块相似度策略
pub trait TextBlockSimilarity: Send + Sync {
    /// 返回 [0.0, 1.0] 区间的相似度
    fn similarity(&self, first: &str, second: &str) -> f64;
}

/// 默认策略：词元集合的 Jaccard 相似度
///
/// ASCII 字母数字串按词切分，CJK 等其他字母按单字切分。
pub struct TokenOverlap;

fn tokenize(text: &str) -> HashSet<String> {
    let mut tokens = HashSet::new();
    let mut word = String::new();

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            word.extend(c.to_lowercase());
        } else {
            if !word.is_empty() {
                tokens.insert(std::mem::take(&mut word));
            }
            if c.is_alphanumeric() {
                tokens.insert(c.to_lowercase().collect());
            }
        }
    }
    if !word.is_empty() {
        tokens.insert(word);
    }

    tokens
}

impl TextBlockSimilarity for TokenOverlap {
    fn similarity(&self, first: &str, second: &str) -> f64 {
        let first_tokens = tokenize(first);
        let second_tokens = tokenize(second);

        if first_tokens.is_empty() || second_tokens.is_empty() {
            return 0.0;
        }

        let intersection = first_tokens.intersection(&second_tokens).count();
        let union = first_tokens.union(&second_tokens).count();

        intersection as f64 / union as f64
    }
}

fn normalized_comment(feedback: &Feedback) -> String {
    feedback
        .text
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// 在快照上找出所有冲突配对
///
/// 只比较不同结果的评语（同一批改内部的差异不是冲突）。
/// 相似文本块上：
/// - 分值差超过 credit_tolerance * max_points → inconsistent_score
/// - 分值一致但评语内容不同 → inconsistent_comment
pub fn find_conflicts(
    snapshot: &[(Feedback, TextBlock)],
    similarity: &dyn TextBlockSimilarity,
    threshold: f64,
    credit_tolerance: f64,
    max_points: f64,
) -> Vec<NewConflict> {
    let credit_limit = credit_tolerance * max_points;
    let mut conflicts = Vec::new();

    for (i, (first, first_block)) in snapshot.iter().enumerate() {
        for (second, second_block) in snapshot.iter().skip(i + 1) {
            if first.result_id == second.result_id {
                continue;
            }

            if similarity.similarity(&first_block.text, &second_block.text) < threshold {
                continue;
            }

            let credit_diff = (first.credits - second.credits).abs();
            let kind = if credit_diff > credit_limit {
                ConflictKind::InconsistentScore
            } else if credit_diff < f64::EPSILON
                && normalized_comment(first) != normalized_comment(second)
            {
                ConflictKind::InconsistentComment
            } else {
                continue;
            };

            // 唯一索引按 (first, second, kind) 去重，固定小 ID 在前
            let (first_id, second_id) = if first.id < second.id {
                (first.id, second.id)
            } else {
                (second.id, first.id)
            };

            conflicts.push(NewConflict {
                first_feedback_id: first_id,
                second_feedback_id: second_id,
                kind,
            });
        }
    }

    conflicts
}

/// 对练习运行一次完整检测并落库
///
/// 由批改完成后的异步任务调用，失败只记日志不回传。
pub async fn run_detection(storage: Arc<dyn Storage>, exercise: Exercise) {
    let config = AppConfig::get();

    let snapshot = match storage
        .list_referenced_feedbacks_for_exercise(exercise.id)
        .await
    {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(
                "Conflict detection skipped for exercise {}: {}",
                exercise.id, e
            );
            return;
        }
    };

    if snapshot.len() < 2 {
        return;
    }

    let conflicts = find_conflicts(
        &snapshot,
        &TokenOverlap,
        config.assessment.conflict_similarity_threshold,
        config.assessment.conflict_credit_tolerance,
        exercise.max_points,
    );

    if conflicts.is_empty() {
        return;
    }

    match storage.insert_conflicts(conflicts).await {
        Ok(inserted) if inserted > 0 => {
            info!(
                "Conflict detection found {} new conflicts for exercise {}",
                inserted, exercise.id
            );
        }
        Ok(_) => {}
        Err(e) => {
            warn!(
                "Failed to persist conflicts for exercise {}: {}",
                exercise.id, e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assessments::entities::FeedbackType;

    fn feedback(id: i64, result_id: i64, credits: f64, text: &str) -> Feedback {
        Feedback {
            id,
            result_id,
            credits,
            text: Some(text.to_string()),
            detail_text: None,
            reference: Some(format!("block:{id}")),
            feedback_type: FeedbackType::Manual,
            created_at: chrono::Utc::now(),
        }
    }

    fn block(id: i64, submission_id: i64, text: &str) -> TextBlock {
        TextBlock {
            id,
            submission_id,
            start_index: 0,
            end_index: text.len() as i32,
            text: text.to_string(),
            feedback_id: Some(id),
        }
    }

    #[test]
    fn test_token_overlap_similarity() {
        let strategy = TokenOverlap;
        assert_eq!(strategy.similarity("the quick fox", "the quick fox"), 1.0);
        assert!(strategy.similarity("the quick brown fox", "the quick brown dog") > 0.5);
        assert!(strategy.similarity("completely different", "nothing alike here") < 0.2);
        assert_eq!(strategy.similarity("", "anything"), 0.0);
    }

    #[test]
    fn test_cjk_text_is_compared_per_character() {
        let strategy = TokenOverlap;
        // 共 9 个单字中重合 7 个
        assert!(strategy.similarity("二分查找的实现", "二分查找的实现思路") > 0.6);
        // 两侧各 6 个单字，重合 4 个，并集 8：恰好落在 0.5
        assert_eq!(strategy.similarity("算法实现正确", "算法实现错误"), 0.5);
        assert!(strategy.similarity("算法实现正确", "排版混乱") < 0.2);
    }

    #[test]
    fn test_detects_inconsistent_score() {
        let snapshot = vec![
            (feedback(1, 10, 5.0, "正确"), block(1, 100, "二分查找的实现")),
            (feedback(2, 20, 1.0, "正确"), block(2, 200, "二分查找的实现")),
        ];
        let conflicts = find_conflicts(&snapshot, &TokenOverlap, 0.6, 0.1, 10.0);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::InconsistentScore);
        assert_eq!(conflicts[0].first_feedback_id, 1);
        assert_eq!(conflicts[0].second_feedback_id, 2);
    }

    #[test]
    fn test_detects_inconsistent_comment() {
        let snapshot = vec![
            (feedback(1, 10, 5.0, "思路清晰"), block(1, 100, "二分查找的实现")),
            (feedback(2, 20, 5.0, "逻辑有误"), block(2, 200, "二分查找的实现")),
        ];
        let conflicts = find_conflicts(&snapshot, &TokenOverlap, 0.6, 0.1, 10.0);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::InconsistentComment);
    }

    #[test]
    fn test_same_result_is_not_a_conflict() {
        let snapshot = vec![
            (feedback(1, 10, 5.0, "正确"), block(1, 100, "二分查找的实现")),
            (feedback(2, 10, 1.0, "错误"), block(2, 100, "二分查找的实现")),
        ];
        let conflicts = find_conflicts(&snapshot, &TokenOverlap, 0.6, 0.1, 10.0);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_dissimilar_blocks_are_ignored() {
        let snapshot = vec![
            (feedback(1, 10, 5.0, "正确"), block(1, 100, "递归终止条件")),
            (feedback(2, 20, 1.0, "错误"), block(2, 200, "输出格式处理")),
        ];
        let conflicts = find_conflicts(&snapshot, &TokenOverlap, 0.6, 0.1, 10.0);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_consistent_assessments_produce_no_conflict() {
        let snapshot = vec![
            (feedback(1, 10, 5.0, "思路清晰"), block(1, 100, "二分查找的实现")),
            (feedback(2, 20, 5.0, "思路清晰"), block(2, 200, "二分查找的实现")),
        ];
        let conflicts = find_conflicts(&snapshot, &TokenOverlap, 0.6, 0.1, 10.0);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_small_credit_difference_within_tolerance() {
        let snapshot = vec![
            (feedback(1, 10, 5.0, "正确"), block(1, 100, "二分查找的实现")),
            (feedback(2, 20, 4.5, "正确"), block(2, 200, "二分查找的实现")),
        ];
        // 容差 10% * 10 分 = 1 分，0.5 分差不算冲突
        let conflicts = find_conflicts(&snapshot, &TokenOverlap, 0.6, 0.1, 10.0);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_detection_requires_automatic_text_exercise() {
        let mut exercise = Exercise {
            id: 7,
            course_id: 1,
            title: "作文一".to_string(),
            kind: ExerciseKind::Text,
            max_points: 10.0,
            due_date: None,
            assessment_due_date: None,
            exam_exercise: false,
            exam_id: None,
            second_correction_enabled: false,
            allow_complaints_for_automatic_assessments: false,
            automatic_assessment_enabled: true,
            example_solution: None,
            grading_instructions: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert!(should_detect(&exercise));

        exercise.automatic_assessment_enabled = false;
        assert!(!should_detect(&exercise));

        exercise.automatic_assessment_enabled = true;
        exercise.kind = ExerciseKind::Programming;
        assert!(!should_detect(&exercise));
    }
}
