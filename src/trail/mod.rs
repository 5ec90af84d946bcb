//! Trail execution API.
//!
//! The trail API builds transactions for each pipeline step, records
//! submitted transaction hashes, answers history queries, and evaluates
//! read-only contract nodes.

pub mod client;
pub mod inputs;
pub mod types;

pub use client::{TrailClient, APP_ID_HEADER};
pub use types::{
    CommunityTotals, CommunityTransaction, EvaluationRequest, EvaluationResponse,
    ExecutionQueryRequest, ExecutionQueryResponse, ExecutionRequest, ExecutionSelector,
    ReadRequest, ReadResponse, SocialProfile, StepStats, UserInputs,
};
