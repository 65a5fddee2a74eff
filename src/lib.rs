pub mod gateway;
pub mod pipeline;
pub mod progress;
pub mod stages;
pub mod store;
pub mod types;
pub mod utils;

pub use gateway::{
    GatewayResponse, GenerationConfig, HttpGateway, ImageConfig, MockGateway, ModelContents,
    ModelGateway, TextConfig,
};
pub use pipeline::{BlogPipeline, PipelineConfig};
pub use progress::{ChannelReporter, LogReporter, NullReporter, ProgressReporter};
pub use store::ClientStore;
pub use types::*;
