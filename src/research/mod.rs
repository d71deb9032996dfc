//! Research records: the list cache, the delete-confirmation dialog, and
//! the list view combining them.
//!
//! | Module          | Responsibility                                          |
//! |-----------------|---------------------------------------------------------|
//! | `models`        | `ResearchRecord`, `AnalysisResult`                      |
//! | `cache`         | `ResearchCache` (wholesale refresh, delete-then-reload) |
//! | `delete_dialog` | `DeleteDialog` state machine                            |
//! | `view`          | `ResearchListView` (cache + dialog)                     |

pub mod cache;
pub mod delete_dialog;
pub mod models;
pub mod view;

pub use cache::{ResearchCache, ResearchSnapshot};
pub use delete_dialog::DeleteDialog;
pub use models::{AnalysisResult, CommunityAnalysis, MarketAnalysis, ResearchRecord};
pub use view::{ListViewError, ListViewSnapshot, ResearchListView};
