/// MediaWiki namespace labels.
///
/// Standard namespaces 0-15 have fixed labels; anything else (project specific
/// namespaces such as Portal or Draft) is shown as `NS:<id>`.
use std::borrow::Cow;

pub const MAIN: i32 = 0;
pub const TALK: i32 = 1;
pub const USER: i32 = 2;
pub const USER_TALK: i32 = 3;
pub const PROJECT: i32 = 4;
pub const PROJECT_TALK: i32 = 5;
pub const FILE: i32 = 6;
pub const FILE_TALK: i32 = 7;
pub const MEDIAWIKI: i32 = 8;
pub const MEDIAWIKI_TALK: i32 = 9;
pub const TEMPLATE: i32 = 10;
pub const TEMPLATE_TALK: i32 = 11;
pub const HELP: i32 = 12;
pub const HELP_TALK: i32 = 13;
pub const CATEGORY: i32 = 14;
pub const CATEGORY_TALK: i32 = 15;

/// Labels for the standard namespaces, indexed by namespace id.
pub const NAMESPACE_LABELS: [&str; 16] = [
    "Main (Article)",
    "Talk",
    "User",
    "User talk",
    "Project",
    "Project talk",
    "File",
    "File talk",
    "MediaWiki",
    "MediaWiki talk",
    "Template",
    "Template talk",
    "Help",
    "Help talk",
    "Category",
    "Category talk",
];

/// Human-readable label for a namespace id.
pub fn label(ns: i32) -> Cow<'static, str> {
    usize::try_from(ns)
        .ok()
        .and_then(|idx| NAMESPACE_LABELS.get(idx))
        .map(|label| Cow::Borrowed(*label))
        .unwrap_or_else(|| Cow::Owned(format!("NS:{}", ns)))
}
