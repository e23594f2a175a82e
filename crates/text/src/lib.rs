//! Text folding for informal order messages.
//!
//! Two layers, both pure:
//! - `normalize`: case/accent/punctuation folding and stopword removal.
//! - `canonical`: plural/abbreviation collapsing into the shared token
//!   vocabulary that catalog names and incoming text are compared in.

pub mod canonical;
pub mod normalize;

pub use canonical::tokenize;
pub use normalize::{fold, normalize, squash, STOPWORDS};
