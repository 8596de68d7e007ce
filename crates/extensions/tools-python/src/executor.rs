//! Subprocess execution of generated Python code.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use quizsolver_protocols::error::ExecutorError;
use quizsolver_protocols::{CodeRunner, ExecutionResult, SubmissionResult};

use crate::parser::parse_submission_result;

const SCRIPT_NAME: &str = "solution.py";

/// Imports made available to every solution. Each group is optional so a
/// missing package only fails the code that actually uses it.
const ENVIRONMENT_IMPORTS: &str = r#"
import json
import csv
import base64
import re
import io
import os
import sys
import warnings
warnings.filterwarnings("ignore")

try:
    import requests
except ImportError:
    pass
try:
    import pandas as pd
    import numpy as np
except ImportError:
    pass
try:
    from bs4 import BeautifulSoup
except ImportError:
    pass
try:
    import PyPDF2
    import pdfplumber
    import openpyxl
    from docx import Document
    from pptx import Presentation
except ImportError:
    pass
try:
    from PIL import Image
    import PIL
    import cv2
except ImportError:
    pass
try:
    import matplotlib
    matplotlib.use("Agg")
    import matplotlib.pyplot as plt
    import seaborn as sns
    import plotly
    import plotly.graph_objects as go
except ImportError:
    pass
try:
    from scipy import stats
except ImportError:
    pass
try:
    import geopandas as gpd
except ImportError:
    pass
try:
    import networkx as nx
except ImportError:
    pass
try:
    from selenium import webdriver
    from selenium.webdriver.common.by import By
    from selenium.webdriver.support.ui import WebDriverWait
    from selenium.webdriver.support import expected_conditions as EC
    from selenium.webdriver.chrome.options import Options as ChromeOptions
except ImportError:
    pass
try:
    from playwright.sync_api import sync_playwright
except ImportError:
    pass
"#;

/// Settings for [`PythonExecutor`].
#[derive(Debug, Clone)]
pub struct PythonExecutorConfig {
    /// Interpreter binary.
    pub python: String,
    pub timeout: Duration,
    pub student_email: String,
    pub student_secret: String,
}

impl Default for PythonExecutorConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            timeout: Duration::from_secs(120),
            student_email: String::new(),
            student_secret: String::new(),
        }
    }
}

/// Runs each solution in a fresh interpreter inside a scratch directory.
pub struct PythonExecutor {
    config: PythonExecutorConfig,
}

impl PythonExecutor {
    pub fn new(config: PythonExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PythonExecutorConfig {
        &self.config
    }

    /// Prelude plus the generated code.
    pub fn build_script(&self, code: &str, quiz_url: &str) -> String {
        let mut script = String::with_capacity(ENVIRONMENT_IMPORTS.len() + code.len() + 256);
        script.push_str(ENVIRONMENT_IMPORTS);
        script.push('\n');
        script.push_str(&format!(
            "STUDENT_EMAIL = {}\n",
            python_string(&self.config.student_email)
        ));
        script.push_str(&format!(
            "STUDENT_SECRET = {}\n",
            python_string(&self.config.student_secret)
        ));
        script.push_str(&format!("QUIZ_URL = {}\n\n", python_string(quiz_url)));
        script.push_str(code);
        script.push('\n');
        script
    }

    async fn run(&self, code: &str, quiz_url: &str) -> Result<ExecutionResult, ExecutorError> {
        let work_dir = tempfile::tempdir()?;
        let script_path = work_dir.path().join(SCRIPT_NAME);
        tokio::fs::write(&script_path, self.build_script(code, quiz_url)).await?;

        let mut cmd = Command::new(&self.config.python);
        cmd.arg("-u")
            .arg(&script_path)
            .current_dir(work_dir.path())
            .env("PYTHONIOENCODING", "utf-8")
            .env("MPLBACKEND", "Agg")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| ExecutorError::SpawnFailed(format!("{}: {}", self.config.python, e)))?;

        let output = timeout(self.config.timeout, child.wait_with_output())
            .await
            .map_err(|_| ExecutorError::Timeout(self.config.timeout.as_secs()))??;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        let mut result = ExecutionResult {
            success: output.status.success(),
            output: stdout,
            ..Default::default()
        };

        if !result.success {
            let code = output.status.code().unwrap_or(-1);
            result.error = Some(
                last_error_line(&stderr)
                    .unwrap_or_else(|| format!("Process exited with code {}", code)),
            );
            if !stderr.trim().is_empty() {
                result.traceback = Some(stderr);
            }
        }

        Ok(result)
    }
}

#[async_trait]
impl CodeRunner for PythonExecutor {
    async fn execute_code(&self, code: &str, quiz_url: &str) -> ExecutionResult {
        info!(quiz_url, "Executing solution code");
        debug!("Solution code:\n{}", code);

        let mut result = match self.run(code, quiz_url).await {
            Ok(result) => result,
            Err(ExecutorError::Timeout(secs)) => {
                error!(secs, "Solution timed out");
                ExecutionResult::failed(format!("Timeout: execution exceeded {} seconds", secs))
            }
            Err(e) => {
                error!(error = %e, "Solution could not be run");
                ExecutionResult::failed(e.to_string())
            }
        };

        if result.success {
            info!("Execution completed");
        } else {
            error!(error = ?result.error, "Execution failed");
            if let Some(tb) = &result.traceback {
                debug!("Traceback:\n{}", tb);
            }
        }

        if result.output.trim().is_empty() {
            warn!("Solution produced no output");
            result.submission = SubmissionResult::default();
        } else {
            info!("Captured output:\n{}", result.output);
            result.submission = parse_submission_result(&result.output);
        }

        result
    }
}

/// Python string literal for an arbitrary value.
fn python_string(value: &str) -> String {
    // JSON string escapes are a subset of Python's.
    serde_json::Value::String(value.to_string()).to_string()
}

/// Last non-empty stderr line, normally `ExceptionType: message`.
fn last_error_line(stderr: &str) -> Option<String> {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
