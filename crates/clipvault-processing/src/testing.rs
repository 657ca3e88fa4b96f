//! Scripted media tool for tests.
//!
//! Lets the pipeline and the API run end to end without ffmpeg installed.

use crate::video::{MediaTool, ToolError, ToolOutput};
use async_trait::async_trait;
use std::sync::Mutex;

type Behaviour = dyn Fn(&[String]) -> Result<ToolOutput, ToolError> + Send + Sync;

/// A [`MediaTool`] whose behaviour is a closure. Every call's arguments are recorded.
pub struct FakeMediaTool {
    program: String,
    behaviour: Box<Behaviour>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeMediaTool {
    pub fn new(
        program: impl Into<String>,
        behaviour: impl Fn(&[String]) -> Result<ToolOutput, ToolError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            program: program.into(),
            behaviour: Box::new(behaviour),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Exits 0 with `stdout`, touching nothing.
    pub fn succeeding(stdout: Vec<u8>) -> Self {
        Self::new("fake", move |_| {
            Ok(ToolOutput {
                status: Some(0),
                stdout: stdout.clone(),
                stderr: Vec::new(),
            })
        })
    }

    /// Exits 1 with `stderr` as diagnostics.
    pub fn failing(stderr: &str) -> Self {
        let stderr = stderr.as_bytes().to_vec();
        Self::new("fake", move |_| {
            Ok(ToolOutput {
                status: Some(1),
                stdout: Vec::new(),
                stderr: stderr.clone(),
            })
        })
    }

    /// Behaves like ffprobe on a file with one `width`x`height` video stream.
    pub fn probe_reporting(width: u32, height: u32) -> Self {
        let json = format!(r#"{{"programs":[],"streams":[{{"width":{width},"height":{height}}}]}}"#);
        let mut tool = Self::succeeding(json.into_bytes());
        tool.program = "ffprobe".to_string();
        tool
    }

    /// Behaves like the ffmpeg fast-start rewrite: copies the `-i` input to
    /// the last argument.
    pub fn faststart_copy() -> Self {
        Self::new("ffmpeg", |args| {
            let input = args
                .iter()
                .position(|a| a == "-i")
                .and_then(|i| args.get(i + 1));
            let output = args.last();

            match (input, output) {
                (Some(input), Some(output)) => match std::fs::copy(input, output) {
                    Ok(_) => Ok(ToolOutput {
                        status: Some(0),
                        ..Default::default()
                    }),
                    Err(e) => Ok(ToolOutput {
                        status: Some(1),
                        stderr: format!("{input}: {e}").into_bytes(),
                        ..Default::default()
                    }),
                },
                _ => Ok(ToolOutput {
                    status: Some(1),
                    stderr: b"missing input or output".to_vec(),
                    ..Default::default()
                }),
            }
        })
    }

    /// Arguments of every call so far.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl MediaTool for FakeMediaTool {
    fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, args: &[String]) -> Result<ToolOutput, ToolError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(args.to_vec());
        }
        (self.behaviour)(args)
    }
}
