//! Persisted models and their mass-assignment whitelists.

mod comment;
mod post;
mod seo;
mod student;

pub use comment::Comment;
pub use post::{Post, PostStatus};
pub use seo::Seo;
pub use student::{Student, StudentFields};

use std::collections::BTreeMap;

/// Attributes a model accepts from client input. Anything else is dropped.
pub trait Fillable {
    const FILLABLE: &'static [&'static str];

    fn fill<V>(attrs: impl IntoIterator<Item = (String, V)>) -> BTreeMap<String, V> {
        attrs
            .into_iter()
            .filter(|(k, _)| Self::FILLABLE.contains(&k.as_str()))
            .collect()
    }
}
