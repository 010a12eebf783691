//! Loading, validation, and randomised draws over the JSON content packs
//! (question bank, dictionary, ranking prompts) that back a quiz game.
//!
//! Nothing in here runs after startup except [`ContentProvider`] draws,
//! which never touch disk — packs are loaded once and held in memory.

mod error;
mod loader;
mod packs;
mod provider;
mod validate;

pub use error::ContentError;
pub use loader::ContentDir;
pub use packs::{
    DictionaryEntry, DictionaryPack, Question, QuestionOption, QuestionPack, RankingPack,
    RankingPrompt,
};
pub use provider::{ContentProvider, InMemoryContentProvider};
pub use validate::{validate_dictionary_pack, validate_question_pack, validate_ranking_pack};
