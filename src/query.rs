//! Query trees: the node model, the query-string parser and tree algebra.

pub mod algebra;
pub mod boolean;
pub mod fuzzy;
pub mod node;
pub mod normalize;
pub mod parser;
pub mod phrase;
pub mod range;
pub mod simplify;
pub mod term;
pub mod wildcard;

pub use self::boolean::{AndNotQuery, BooleanQuery, NotQuery};
pub use self::fuzzy::FuzzyTermQuery;
pub use self::node::QueryNode;
pub use self::parser::{QueryParser, QueryParserBuilder};
pub use self::phrase::PhraseQuery;
pub use self::range::{Bound, RangeQuery};
pub use self::simplify::SimplifyConfig;
pub use self::term::{EveryQuery, TermQuery, VariationsQuery};
pub use self::wildcard::{PrefixQuery, WildcardQuery};
