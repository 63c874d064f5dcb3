//! Paths of the journal API, relative to the base URL.

use crate::models::CatalogKind;

pub const SESSION_SIGN_IN: &str = "/sessions/sign-in";
pub const SESSION_VERIFY: &str = "/sessions/verify";

pub const HEADACHES: &str = "/headaches";
pub const HEADACHES_UNENDED: &str = "/headaches/unended";
pub const STATS: &str = "/stats";

pub fn headache(id: &str) -> String {
    format!("/headaches/{}", id)
}

/// The API routes the "end" action through the detail path with a trailing slash
pub fn headache_end(id: &str) -> String {
    format!("/headaches/{}/", id)
}

pub fn headache_remedies(id: &str) -> String {
    format!("/headaches/{}/remedies", id)
}

pub fn headache_remedy_result(id: &str, remedy_id: &str) -> String {
    format!("/headaches/{}/remedies/{}/result", id, remedy_id)
}

pub fn headache_foods_and_drinks(id: &str) -> String {
    format!("/headaches/{}/foods-and-drinks", id)
}

pub fn catalog(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::Foods => "/foods",
        CatalogKind::Drinks => "/drinks",
        CatalogKind::Remedies => "/remedies",
    }
}
