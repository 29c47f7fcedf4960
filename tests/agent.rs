mod common;

use agentic_rag::agent::{FallbackAgent, MessageRole, ReactAgent, AGENT_SYSTEM_PROMPT};
use agentic_rag::tools::ToolRegistry;

use common::{llm, FakeTool, ScriptedProvider};

#[tokio::test]
async fn tool_turn_then_final_answer() {
    let provider = ScriptedProvider::new([
        r#"{"type":"tool_call","tool_name":"wikipedia","tool_args":{"query":"Alan Turing"}}"#,
        r#"{"type":"final","content":"Turing was a mathematician."}"#,
    ]);
    let tool = FakeTool::ok("Page: Alan Turing\nSummary: English mathematician.");
    let agent = ReactAgent::new(llm(&provider), ToolRegistry::new().with_tool(tool.clone()));

    let trace = agent.invoke("Who was Alan Turing?").await.unwrap();

    assert_eq!(trace.messages.len(), 3);
    assert_eq!(trace.messages[0].role, MessageRole::Assistant);
    assert!(trace.messages[0].content.is_empty());
    assert_eq!(trace.messages[0].tool_calls[0].name, "wikipedia");
    assert_eq!(trace.messages[1].role, MessageRole::Tool);
    assert_eq!(
        trace.collect_content().unwrap(),
        "Page: Alan Turing\nSummary: English mathematician.\n\nTuring was a mathematician."
    );
    assert_eq!(tool.queries.lock().unwrap().as_slice(), ["Alan Turing".to_string()]);

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].messages[0].content.starts_with(AGENT_SYSTEM_PROMPT));
    assert_eq!(requests[0].messages[1].content, "Who was Alan Turing?");
    let observation = &requests[1].messages.last().unwrap().content;
    assert!(observation.starts_with("Tool `wikipedia` result:"));
}

#[tokio::test]
async fn direct_answer_skips_tools() {
    let provider = ScriptedProvider::new(["Paris is the capital of France."]);
    let tool = FakeTool::ok("unused");
    let agent = ReactAgent::new(llm(&provider), ToolRegistry::new().with_tool(tool.clone()));

    let trace = agent.invoke("Capital of France?").await.unwrap();

    assert_eq!(trace.collect_content().unwrap(), "Paris is the capital of France.");
    assert!(tool.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn tool_failures_are_recorded_and_the_loop_continues() {
    let provider = ScriptedProvider::new([
        r#"{"type":"tool_call","tool_name":"wikipedia","tool_args":{"query":"x"}}"#,
        r#"{"type":"final","content":""}"#,
    ]);
    let agent = ReactAgent::new(
        llm(&provider),
        ToolRegistry::new().with_tool(FakeTool::failing("HTTP 503")),
    );

    let trace = agent.invoke("q").await.unwrap();

    assert_eq!(trace.messages.len(), 3);
    assert!(trace.messages[1].content.contains("Tool `wikipedia` failed"));
    assert!(trace.messages[1].content.contains("HTTP 503"));
    assert!(trace.messages[2].content.is_empty());
}

#[tokio::test]
async fn step_limit_ends_the_trace() {
    let call = r#"{"type":"tool_call","tool_name":"wikipedia","tool_args":{"query":"loop"}}"#;
    let provider = ScriptedProvider::new([call, call, call]);
    let tool = FakeTool::ok("same page");
    let agent = ReactAgent::new(llm(&provider), ToolRegistry::new().with_tool(tool.clone()))
        .with_max_steps(2);

    let trace = agent.invoke("q").await.unwrap();

    assert_eq!(provider.call_count(), 2);
    assert_eq!(tool.queries.lock().unwrap().len(), 2);
    assert_eq!(trace.messages.len(), 4);
    assert_eq!(trace.collect_content().unwrap(), "same page\n\nsame page");
}

#[tokio::test]
async fn model_errors_propagate() {
    let provider = ScriptedProvider::new(Vec::<String>::new());
    let agent = ReactAgent::new(llm(&provider), ToolRegistry::new());

    let err = agent.invoke("q").await.unwrap_err();
    assert!(err.to_string().contains("no scripted reply left"));
}
