pub mod address;
pub mod amount;
pub mod id;
pub mod quest;
pub mod submission;

pub use address::AccountAddress;
pub use amount::RewardAmount;
pub use id::{QuestId, SubmissionId, UserId};
pub use quest::Quest;
pub use submission::{ActorRole, Submission, SubmissionStatus};
