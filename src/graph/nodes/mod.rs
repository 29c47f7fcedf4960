// Graph Nodes Module

pub mod generate;
pub mod responder;
pub mod retrieve;

pub use generate::{build_answer_prompt, GenerateNode};
pub use responder::{AgentFactory, ResponderNode, NO_ANSWER, SUMMARY_SYSTEM_PROMPT};
pub use retrieve::RetrieveNode;
