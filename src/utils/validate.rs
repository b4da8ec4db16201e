use crate::models::assessments::entities::FeedbackType;
use crate::models::assessments::requests::FeedbackPayload;

/// 验证单条评语负载
///
/// 规则：
/// - manual 类型必须携带 reference，且长度不超过 max_reference_length
/// - 带引用的评语必须有非空正文
/// - manual_unreferenced 类型不得携带 reference
/// - credits 必须是有限数
pub fn validate_feedback(
    feedback: &FeedbackPayload,
    max_reference_length: usize,
) -> Result<(), String> {
    if !feedback.credits.is_finite() {
        return Err("Feedback credits must be a finite number".to_string());
    }
    match feedback.feedback_type {
        FeedbackType::Manual => {
            match &feedback.reference {
                None => {
                    return Err(
                        "Referenced feedback must carry a text block reference".to_string()
                    );
                }
                Some(reference) if reference.is_empty() => {
                    return Err("Feedback reference must not be empty".to_string());
                }
                Some(reference) if reference.chars().count() > max_reference_length => {
                    return Err(format!(
                        "Feedback reference exceeds the maximum length of {max_reference_length} characters"
                    ));
                }
                Some(_) => {}
            }
            match feedback.text.as_deref() {
                Some(text) if !text.trim().is_empty() => Ok(()),
                _ => Err("Referenced feedback must carry a non-empty text".to_string()),
            }
        }
        FeedbackType::ManualUnreferenced | FeedbackType::Automatic => {
            if feedback.reference.is_some() {
                Err("Unreferenced feedback must not carry a text block reference".to_string())
            } else {
                Ok(())
            }
        }
    }
}

/// 验证整组评语负载
pub fn validate_feedbacks(
    feedbacks: &[FeedbackPayload],
    max_reference_length: usize,
) -> Result<(), String> {
    for feedback in feedbacks {
        validate_feedback(feedback, max_reference_length)?;
    }
    Ok(())
}

/// 验证申诉正文长度（按字符计）
pub fn validate_complaint_text(text: &str, max_length: i64) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("Complaint text must not be empty".to_string());
    }
    if text.chars().count() as i64 > max_length {
        return Err(format!(
            "Complaint text exceeds the maximum length of {max_length} characters"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn referenced(reference: Option<&str>) -> FeedbackPayload {
        FeedbackPayload {
            credits: 1.0,
            text: Some("不错".to_string()),
            detail_text: None,
            reference: reference.map(str::to_string),
            feedback_type: FeedbackType::Manual,
        }
    }

    #[test]
    fn test_referenced_feedback_requires_reference() {
        assert!(validate_feedback(&referenced(Some("block:12")), 2000).is_ok());
        assert!(validate_feedback(&referenced(None), 2000).is_err());
        assert!(validate_feedback(&referenced(Some("")), 2000).is_err());
    }

    #[test]
    fn test_referenced_feedback_requires_text() {
        let mut feedback = referenced(Some("block:12"));
        feedback.text = None;
        assert!(validate_feedback(&feedback, 2000).is_err());
        feedback.text = Some("   ".to_string());
        assert!(validate_feedback(&feedback, 2000).is_err());
        feedback.text = Some("不错".to_string());
        assert!(validate_feedback(&feedback, 2000).is_ok());
    }

    #[test]
    fn test_reference_length_limit() {
        let long = "x".repeat(2001);
        assert!(validate_feedback(&referenced(Some(&long)), 2000).is_err());
        let exact = "x".repeat(2000);
        assert!(validate_feedback(&referenced(Some(&exact)), 2000).is_ok());
    }

    #[test]
    fn test_unreferenced_feedback_rejects_reference() {
        let mut feedback = referenced(Some("block:12"));
        feedback.feedback_type = FeedbackType::ManualUnreferenced;
        assert!(validate_feedback(&feedback, 2000).is_err());
        feedback.reference = None;
        assert!(validate_feedback(&feedback, 2000).is_ok());
    }

    #[test]
    fn test_non_finite_credits_rejected() {
        let mut feedback = referenced(Some("block:12"));
        feedback.credits = f64::NAN;
        assert!(validate_feedback(&feedback, 2000).is_err());
        feedback.credits = f64::INFINITY;
        assert!(validate_feedback(&feedback, 2000).is_err());
    }

    #[test]
    fn test_complaint_text_limits() {
        assert!(validate_complaint_text("分数不对", 2000).is_ok());
        assert!(validate_complaint_text("   ", 2000).is_err());
        let long = "长".repeat(2001);
        assert!(validate_complaint_text(&long, 2000).is_err());
    }
}
