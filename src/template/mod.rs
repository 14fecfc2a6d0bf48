//! Declarative rule tables and the engine that runs them.
//!
//! # Module Structure
//!
//! - `matcher`: `TagPattern` predicates and handler types
//! - `builder`: fluent `RuleTableBuilder`
//! - `table`: the immutable `RuleTable` and its parse entry points
//! - `engine`: dispatch and content capture over the token stream
//!
//! # Usage
//!
//! ```rust
//! use std::sync::LazyLock;
//! use rs_chanscrape::template::RuleTable;
//!
//! #[derive(Default)]
//! struct Holder {
//!     links: Vec<String>,
//! }
//!
//! static TABLE: LazyLock<Option<RuleTable<Holder>>> = LazyLock::new(|| {
//!     RuleTable::builder()
//!         .name("a")
//!         .open(|holder: &mut Holder, _, attrs| {
//!             if let Some(href) = attrs.get("href") {
//!                 holder.links.push(href.to_string());
//!             }
//!             Ok(false)
//!         })
//!         .build()
//!         .ok()
//! });
//!
//! let mut holder = Holder::default();
//! if let Some(table) = TABLE.as_ref() {
//!     table.parse(r#"<p><a href="/b/res/1.html">1</a></p>"#, &mut holder)?;
//! }
//! assert_eq!(holder.links, vec!["/b/res/1.html"]);
//! # Ok::<(), rs_chanscrape::Error>(())
//! ```

pub mod builder;
mod engine;
pub mod matcher;
pub mod table;

pub use builder::RuleTableBuilder;
pub use matcher::{ContentHandler, Matcher, OpenHandler, TagPattern};
pub use table::RuleTable;
