use clap::Parser;
use std::path::PathBuf;

/// Command line interface for the application
#[derive(Parser, Debug)]
#[command(name = "orchestra", version, about = "Route a task through specialized LLM workers")]
pub struct Cli {
    /// Task to run; interactive mode starts when omitted
    pub task: Vec<String>,

    /// Path to the YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Sets the logging verbosity level for the application
    /// Possible values: "error", "warn", "info", "debug", "trace"
    /// Default: "info"
    #[arg(long, default_value_t = String::from("info"))]
    pub logging_level: String,

    /// Also write logs to a daily rotating file under logs/
    #[arg(long)]
    pub log_file: bool,

    /// LLM provider overriding the configuration (openai, anthropic, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM model overriding the configuration
    #[arg(long)]
    pub llm_model: Option<String>,

    /// Iteration ceiling overriding the configuration
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Write the run report as JSON to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// The task words joined back together, if any were given
    pub fn task(&self) -> Option<String> {
        let task = self.task.join(" ");
        let task = task.trim();
        (!task.is_empty()).then(|| task.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_words_are_joined() {
        let cli = Cli::parse_from(["orchestra", "Build", "a", "CLI", "--max-iterations", "3"]);
        assert_eq!(cli.task().as_deref(), Some("Build a CLI"));
        assert_eq!(cli.max_iterations, Some(3));
        assert_eq!(cli.logging_level, "info");
    }

    #[test]
    fn no_task_means_interactive() {
        let cli = Cli::parse_from(["orchestra", "--config", "orchestra.yaml", "--log-file"]);
        assert!(cli.task().is_none());
        assert!(cli.log_file);
        assert_eq!(cli.config, Some(PathBuf::from("orchestra.yaml")));
    }
}
