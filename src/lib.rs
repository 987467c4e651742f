//! Client-side engine for a cross-chain AI-NFT dApp on the ZetaChain
//! Athens testnet family. Manages the wallet session, drives network
//! switches through the injected provider, discovers owned tokens
//! across every supported chain, and orchestrates mints and
//! cross-chain transfers.

pub mod config;
pub mod constants;
pub mod contract;
pub mod discovery;
pub mod error;
pub mod mint;
pub mod models;
pub mod provider;
pub mod registry;
pub mod rpc;
pub mod session;
pub mod status;
pub mod switcher;
pub mod transfer;
