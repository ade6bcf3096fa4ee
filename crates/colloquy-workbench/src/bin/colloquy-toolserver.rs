//! Reference tool server used by the integration tests and as a
//! demonstration of the stdio protocol.
//!
//! Tools:
//! - `echo`: returns its `text` argument unchanged
//! - `reverse`: returns `text` reversed
//! - `fail`: always reports a tool failure
//! - `sleep`: waits `millis` before answering, for timeout testing
//! - `die`: exits the process without responding

use serde_json::{Value, json};

use colloquy_core::ToolName;
use colloquy_workbench::{ServerTool, ToolServer};

struct Echo;

impl ServerTool for Echo {
    fn name(&self) -> ToolName {
        ToolName::new_unchecked("echo")
    }

    fn call(&self, arguments: Value) -> Result<Value, String> {
        let text = text_argument(&arguments)?;
        Ok(json!({ "text": text }))
    }
}

struct Reverse;

impl ServerTool for Reverse {
    fn name(&self) -> ToolName {
        ToolName::new_unchecked("reverse")
    }

    fn call(&self, arguments: Value) -> Result<Value, String> {
        let text: String = text_argument(&arguments)?.chars().rev().collect();
        Ok(json!({ "text": text }))
    }
}

struct Fail;

impl ServerTool for Fail {
    fn name(&self) -> ToolName {
        ToolName::new_unchecked("fail")
    }

    fn call(&self, _arguments: Value) -> Result<Value, String> {
        Err("this tool always fails".into())
    }
}

struct Sleep;

impl ServerTool for Sleep {
    fn name(&self) -> ToolName {
        ToolName::new_unchecked("sleep")
    }

    fn call(&self, arguments: Value) -> Result<Value, String> {
        let millis = arguments["millis"]
            .as_u64()
            .ok_or_else(|| "missing 'millis' argument".to_string())?;
        std::thread::sleep(std::time::Duration::from_millis(millis));
        Ok(json!({ "slept_ms": millis }))
    }
}

struct Die;

impl ServerTool for Die {
    fn name(&self) -> ToolName {
        ToolName::new_unchecked("die")
    }

    fn call(&self, _arguments: Value) -> Result<Value, String> {
        std::process::exit(1);
    }
}

fn text_argument(arguments: &Value) -> Result<&str, String> {
    arguments["text"]
        .as_str()
        .ok_or_else(|| "missing 'text' argument".to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    // stdout carries protocol frames, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    ToolServer::new()
        .register(Echo)
        .register(Reverse)
        .register(Fail)
        .register(Sleep)
        .register(Die)
        .serve_stdio()
        .await
}
