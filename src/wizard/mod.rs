pub mod commands;
pub mod controller;
pub mod draft;
pub mod state;


pub use controller::{SubmitOutcome, WizardController};
pub use draft::{parse_tags, DraftPatch, EntryDraft};
pub use state::{RecordingSession, WizardSnapshot, WizardStage};
