// cwprune - list CloudWatch log groups by name and delete them on confirmation
//
// Flow: list (paginated) -> filter by name substring -> report -> confirm and
// delete each match in order, retrying deletes while the service is
// unavailable.

pub mod confirm;
pub mod error;
mod init;
pub mod provider;
pub mod prune;
pub mod record;
pub mod retry;

pub use confirm::{ConfirmDeletion, DecisionList, FixedDecision, ReaderPrompt, TerminalPrompt};
pub use error::{DeleteError, PruneError, Result};
pub use init::init_tracing;
pub use provider::{CloudWatchLogsProvider, InMemoryProvider, LogGroupPage, LogGroupProvider};
pub use prune::{DeletionOutcome, LogGroupPruner, NameFilter, PruneSummary};
pub use record::LogGroupRecord;
