//! 预导入模块，方便使用

pub use super::complaint_responses::{
    ActiveModel as ComplaintResponseActiveModel, Entity as ComplaintResponses,
    Model as ComplaintResponseModel,
};
pub use super::complaints::{
    ActiveModel as ComplaintActiveModel, Entity as Complaints, Model as ComplaintModel,
};
pub use super::course_users::{
    ActiveModel as CourseUserActiveModel, Entity as CourseUsers, Model as CourseUserModel,
};
pub use super::courses::{
    ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel,
};
pub use super::exercises::{
    ActiveModel as ExerciseActiveModel, Entity as Exercises, Model as ExerciseModel,
};
pub use super::feedback_conflicts::{
    ActiveModel as FeedbackConflictActiveModel, Entity as FeedbackConflicts,
    Model as FeedbackConflictModel,
};
pub use super::feedbacks::{
    ActiveModel as FeedbackActiveModel, Entity as Feedbacks, Model as FeedbackModel,
};
pub use super::participations::{
    ActiveModel as ParticipationActiveModel, Entity as Participations,
    Model as ParticipationModel,
};
pub use super::results::{
    ActiveModel as ResultActiveModel, Entity as Results, Model as ResultModel,
};
pub use super::submissions::{
    ActiveModel as SubmissionActiveModel, Entity as Submissions, Model as SubmissionModel,
};
pub use super::text_blocks::{
    ActiveModel as TextBlockActiveModel, Entity as TextBlocks, Model as TextBlockModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
