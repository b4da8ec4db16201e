use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Status).string().not_null())
                    .col(ColumnDef::new(Users::DisplayName).string().null())
                    .col(ColumnDef::new(Users::AvatarUrl).string().null())
                    .col(ColumnDef::new(Users::LastLogin).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建课程表
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Courses::Title).string().not_null())
                    .col(
                        ColumnDef::new(Courses::ShortName)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Courses::MaxAssessmentLocks)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Courses::MaxComplaints)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Courses::MaxComplaintTimeDays)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Courses::MaxComplaintTextLimit)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Courses::MaxComplaintResponseTextLimit)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Courses::SecondCorrectionEnabled)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Courses::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Courses::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建课程成员表
        manager
            .create_table(
                Table::create()
                    .table(CourseUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CourseUsers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CourseUsers::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseUsers::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CourseUsers::Role).string().not_null())
                    .col(
                        ColumnDef::new(CourseUsers::JoinedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CourseUsers::Table, CourseUsers::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CourseUsers::Table, CourseUsers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 课程成员唯一性：一个用户在一门课程中只有一条成员记录
        manager
            .create_index(
                Index::create()
                    .name("idx_course_users_course_user")
                    .table(CourseUsers::Table)
                    .col(CourseUsers::CourseId)
                    .col(CourseUsers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 创建练习表
        manager
            .create_table(
                Table::create()
                    .table(Exercises::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Exercises::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Exercises::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Exercises::Title).string().not_null())
                    .col(ColumnDef::new(Exercises::Kind).string().not_null())
                    .col(ColumnDef::new(Exercises::MaxPoints).double().not_null())
                    .col(ColumnDef::new(Exercises::DueDate).big_integer().null())
                    .col(
                        ColumnDef::new(Exercises::AssessmentDueDate)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Exercises::ExamExercise).boolean().not_null())
                    .col(ColumnDef::new(Exercises::ExamId).big_integer().null())
                    .col(
                        ColumnDef::new(Exercises::SecondCorrectionEnabled)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Exercises::AllowComplaintsForAutomaticAssessments)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Exercises::AutomaticAssessmentEnabled)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Exercises::ExampleSolution).text().null())
                    .col(
                        ColumnDef::new(Exercises::GradingInstructions)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Exercises::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Exercises::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Exercises::Table, Exercises::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建参与表
        manager
            .create_table(
                Table::create()
                    .table(Participations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Participations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Participations::ExerciseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participations::StudentId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Participations::TeamId).big_integer().null())
                    .col(
                        ColumnDef::new(Participations::TeamTutorId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Participations::TestRun)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participations::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Participations::Table, Participations::ExerciseId)
                            .to(Exercises::Table, Exercises::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建提交表
        manager
            .create_table(
                Table::create()
                    .table(Submissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Submissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Submissions::ParticipationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::Kind).string().not_null())
                    .col(ColumnDef::new(Submissions::Submitted).boolean().not_null())
                    .col(
                        ColumnDef::new(Submissions::SubmittedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Submissions::TextContent).text().null())
                    .col(ColumnDef::new(Submissions::ModelJson).text().null())
                    .col(ColumnDef::new(Submissions::FilePath).string().null())
                    .col(ColumnDef::new(Submissions::CommitHash).string().null())
                    .col(
                        ColumnDef::new(Submissions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Submissions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Submissions::Table, Submissions::ParticipationId)
                            .to(Participations::Table, Participations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建结果表
        manager
            .create_table(
                Table::create()
                    .table(Results::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Results::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Results::SubmissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Results::CorrectionRound)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Results::State).string().not_null())
                    .col(ColumnDef::new(Results::AssessorId).big_integer().not_null())
                    .col(ColumnDef::new(Results::Score).double().null())
                    .col(ColumnDef::new(Results::Rated).boolean().not_null())
                    .col(ColumnDef::new(Results::AssessmentType).string().not_null())
                    .col(ColumnDef::new(Results::LockedAt).big_integer().not_null())
                    .col(
                        ColumnDef::new(Results::CompletionDate)
                            .big_integer()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Results::Table, Results::SubmissionId)
                            .to(Submissions::Table, Submissions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Results::Table, Results::AssessorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 互斥不变量：每个 (submission, correction_round) 最多一行结果，
        // 并发抢锁依赖该唯一索引在 INSERT 时裁决
        manager
            .create_index(
                Index::create()
                    .name("idx_results_submission_round")
                    .table(Results::Table)
                    .col(Results::SubmissionId)
                    .col(Results::CorrectionRound)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 创建评语表
        manager
            .create_table(
                Table::create()
                    .table(Feedbacks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Feedbacks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Feedbacks::ResultId).big_integer().not_null())
                    .col(ColumnDef::new(Feedbacks::Credits).double().not_null())
                    .col(ColumnDef::new(Feedbacks::Text).string().null())
                    .col(ColumnDef::new(Feedbacks::DetailText).text().null())
                    .col(ColumnDef::new(Feedbacks::Reference).string().null())
                    .col(ColumnDef::new(Feedbacks::FeedbackType).string().not_null())
                    .col(
                        ColumnDef::new(Feedbacks::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Feedbacks::Table, Feedbacks::ResultId)
                            .to(Results::Table, Results::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建文本块表
        manager
            .create_table(
                Table::create()
                    .table(TextBlocks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TextBlocks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TextBlocks::SubmissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TextBlocks::StartIndex).integer().not_null())
                    .col(ColumnDef::new(TextBlocks::EndIndex).integer().not_null())
                    .col(ColumnDef::new(TextBlocks::Text).text().not_null())
                    .col(ColumnDef::new(TextBlocks::FeedbackId).big_integer().null())
                    .col(
                        ColumnDef::new(TextBlocks::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TextBlocks::Table, TextBlocks::SubmissionId)
                            .to(Submissions::Table, Submissions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建申诉表
        manager
            .create_table(
                Table::create()
                    .table(Complaints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Complaints::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Complaints::ResultId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Complaints::Kind).string().not_null())
                    .col(ColumnDef::new(Complaints::ComplaintText).text().not_null())
                    .col(
                        ColumnDef::new(Complaints::SubmitterId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Complaints::ExamId).big_integer().null())
                    .col(ColumnDef::new(Complaints::Accepted).boolean().null())
                    .col(
                        ColumnDef::new(Complaints::SubmittedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Complaints::Table, Complaints::ResultId)
                            .to(Results::Table, Results::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Complaints::Table, Complaints::SubmitterId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建申诉回复表
        manager
            .create_table(
                Table::create()
                    .table(ComplaintResponses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComplaintResponses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComplaintResponses::ComplaintId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ComplaintResponses::Accepted)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComplaintResponses::ResponseText)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ComplaintResponses::ReviewerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComplaintResponses::SubmittedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ComplaintResponses::Table, ComplaintResponses::ComplaintId)
                            .to(Complaints::Table, Complaints::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ComplaintResponses::Table, ComplaintResponses::ReviewerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建评语冲突表
        manager
            .create_table(
                Table::create()
                    .table(FeedbackConflicts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeedbackConflicts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FeedbackConflicts::FirstFeedbackId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FeedbackConflicts::SecondFeedbackId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FeedbackConflicts::Kind).string().not_null())
                    .col(
                        ColumnDef::new(FeedbackConflicts::Solved)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FeedbackConflicts::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FeedbackConflicts::Table, FeedbackConflicts::FirstFeedbackId)
                            .to(Feedbacks::Table, Feedbacks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                FeedbackConflicts::Table,
                                FeedbackConflicts::SecondFeedbackId,
                            )
                            .to(Feedbacks::Table, Feedbacks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一对评语同一类冲突只记录一次
        manager
            .create_index(
                Index::create()
                    .name("idx_feedback_conflicts_pair_kind")
                    .table(FeedbackConflicts::Table)
                    .col(FeedbackConflicts::FirstFeedbackId)
                    .col(FeedbackConflicts::SecondFeedbackId)
                    .col(FeedbackConflicts::Kind)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FeedbackConflicts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ComplaintResponses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Complaints::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TextBlocks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Feedbacks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Results::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Submissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Participations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Exercises::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CourseUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Role,
    Status,
    DisplayName,
    AvatarUrl,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
    Title,
    ShortName,
    MaxAssessmentLocks,
    MaxComplaints,
    MaxComplaintTimeDays,
    MaxComplaintTextLimit,
    MaxComplaintResponseTextLimit,
    SecondCorrectionEnabled,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CourseUsers {
    Table,
    Id,
    CourseId,
    UserId,
    Role,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Exercises {
    Table,
    Id,
    CourseId,
    Title,
    Kind,
    MaxPoints,
    DueDate,
    AssessmentDueDate,
    ExamExercise,
    ExamId,
    SecondCorrectionEnabled,
    AllowComplaintsForAutomaticAssessments,
    AutomaticAssessmentEnabled,
    ExampleSolution,
    GradingInstructions,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Participations {
    Table,
    Id,
    ExerciseId,
    StudentId,
    TeamId,
    TeamTutorId,
    TestRun,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Submissions {
    Table,
    Id,
    ParticipationId,
    Kind,
    Submitted,
    SubmittedAt,
    TextContent,
    ModelJson,
    FilePath,
    CommitHash,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Results {
    Table,
    Id,
    SubmissionId,
    CorrectionRound,
    State,
    AssessorId,
    Score,
    Rated,
    AssessmentType,
    LockedAt,
    CompletionDate,
}

#[derive(DeriveIden)]
enum Feedbacks {
    Table,
    Id,
    ResultId,
    Credits,
    Text,
    DetailText,
    Reference,
    FeedbackType,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TextBlocks {
    Table,
    Id,
    SubmissionId,
    StartIndex,
    EndIndex,
    Text,
    FeedbackId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Complaints {
    Table,
    Id,
    ResultId,
    Kind,
    ComplaintText,
    SubmitterId,
    ExamId,
    Accepted,
    SubmittedAt,
}

#[derive(DeriveIden)]
enum ComplaintResponses {
    Table,
    Id,
    ComplaintId,
    Accepted,
    ResponseText,
    ReviewerId,
    SubmittedAt,
}

#[derive(DeriveIden)]
enum FeedbackConflicts {
    Table,
    Id,
    FirstFeedbackId,
    SecondFeedbackId,
    Kind,
    Solved,
    CreatedAt,
}
