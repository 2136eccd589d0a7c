//! Engine runtime: evaluation contexts, the registry, the filler, and the
//! supporting path and debounce utilities.

pub mod context;
pub mod debounce;
pub mod filler;
pub mod path;
pub mod registry;

pub use context::{
    ActionContext, CancelSignal, EvaluatorContext, FileStat, FillOptions, Heading, HostServices,
    NullHost, PromptRequest, DUMMY_PATH,
};
pub use debounce::Debouncer;
pub use filler::{TemplateEngine, MAX_FILL_DEPTH};
pub use registry::TokenRegistry;
