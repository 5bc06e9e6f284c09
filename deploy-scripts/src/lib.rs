//! Scripts for deploying and upgrading the Laxce token and crowdsale
//! contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

mod artifacts;
pub mod cli;
mod commands;
pub mod constants;
pub mod errors;
mod etherscan;
pub mod network;
mod solidity;
pub mod utils;
