pub mod forecast_pipeline;
mod pipeline_test;
