//! Global constants used throughout the metatree codebase.
//!
//! Markup vocabulary, retry parameters and file names live here so that the
//! scanner, the loaders and the CLI agree on them.

use std::time::Duration;

/// `rel` token marking a `<link>` as a document import.
pub const IMPORT_LINK_REL: &str = "import";

/// Tag name of structural template nodes.
pub const TEMPLATE_TAG: &str = "dom-module";

/// Attribute on a template node holding the element name it defines.
pub const TEMPLATE_ID_ATTR: &str = "id";

/// Attribute on an import link holding the target address.
pub const IMPORT_HREF_ATTR: &str = "href";

/// Attribute on a script node referencing external content.
pub const SCRIPT_SRC_ATTR: &str = "src";

/// Script `type` values treated as JavaScript. A missing `type` also counts.
pub const JAVASCRIPT_TYPES: &[&str] = &[
    "text/javascript",
    "application/javascript",
    "application/ecmascript",
    "text/ecmascript",
    "module",
];

/// Name of the optional configuration file looked up next to the root document.
pub const CONFIG_FILE_NAME: &str = "metatree.toml";

/// Default number of retries for remote fetches.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Starting delay for exponential backoff on remote fetches (50ms).
pub const STARTING_BACKOFF_DELAY_MS: u64 = 50;

/// Maximum backoff delay for remote fetches (2 seconds).
pub const MAX_BACKOFF_DELAY: Duration = Duration::from_secs(2);
