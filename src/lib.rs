pub mod abi;
pub mod classifier;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod profile;
pub mod resolver;
pub mod rpc;
pub mod scanner;
pub mod uniswap;
