/// Sender/recipient identifier used by the engine in the message log.
pub const ORCHESTRATOR_ID: &str = "orchestrator";

/// Final output when no step produced a usable result; no generation call is made.
pub const NO_SUCCESSFUL_OUTPUTS: &str = "No successful outputs from workers.";

/// Reply of the QA worker when there is nothing in the shared context to review.
pub const QA_NOTHING_TO_REVIEW: &str = "No outputs available to review.";

/// Default ceiling of step executions per run.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Default upper bound of steps accepted from a generated plan.
pub const DEFAULT_MAX_PLAN_STEPS: usize = 5;

/// Sampling temperature used when asking for a plan.
pub const DEFAULT_PLANNER_TEMPERATURE: f32 = 0.3;

/// Output budget of the synthesis call.
pub const DEFAULT_SYNTHESIS_MAX_TOKENS: u32 = 2000;

/// Number of run reports kept by the in-process archive.
pub const DEFAULT_ARCHIVE_CAPACITY: usize = 50;

/// Per-output character budget when the QA worker assembles its review material.
pub const QA_REVIEW_EXCERPT_CHARS: usize = 1000;

/// Instructions of the fixed fallback plan.
pub const DEFAULT_RESEARCH_INSTRUCTION: &str = "Gather information relevant to the task";
pub const DEFAULT_WRITING_INSTRUCTION: &str = "Write the final response to the task";

/// System prompt of the engine itself, used for planning and synthesis
pub const ORCHESTRATOR_SYSTEM_PROMPT: &str = "You are an orchestrator that coordinates multiple specialized workers.
Your role is to:
1. Analyze incoming tasks
2. Break them down into subtasks
3. Route subtasks to appropriate workers
4. Synthesize results into a final output

You must decide which workers to use and in what order.";

pub const RESEARCH_SYSTEM_PROMPT: &str = "You are a research worker specialized in gathering information.
Your capabilities:
- Information retrieval and summarization
- Fact verification
- Source citation

Always provide sources and verify information accuracy.";

pub const CODE_SYSTEM_PROMPT: &str = "You are a code worker specialized in writing code.
Your capabilities:
- Code generation
- Debugging
- Test writing

Always write clean, well-documented code with error handling.";

pub const DATA_SYSTEM_PROMPT: &str = "You are a data worker specialized in data analysis.
Your capabilities:
- Data processing
- Statistical analysis
- Describing useful visualizations

Always explain your analysis and the reasoning behind it.";

pub const WRITING_SYSTEM_PROMPT: &str = "You are a writing worker specialized in content creation.
Your capabilities:
- Article and report writing
- Editing and proofreading
- Format adaptation (markdown, HTML, etc.)

Always create engaging, well-structured content.";

pub const QA_SYSTEM_PROMPT: &str = "You are a QA worker specialized in validation.
Your capabilities:
- Fact checking
- Quality review
- Error detection
- Completeness verification

Always provide specific feedback and improvement suggestions.";

/// Requirements appended to every code generation request
pub const CODE_REQUIREMENTS: &str = "Requirements:
1. Include documentation comments
2. Add error handling
3. Use precise types
4. Follow the idioms of the language
5. Make it production-ready

Generate ONLY the code, no explanations.";

/// Requirements appended to every writing request
pub const WRITING_REQUIREMENTS: &str = "Requirements:
1. Well-structured and organized
2. Clear and engaging writing
3. Use markdown formatting
4. Include relevant sections/headers
5. Cite sources when using research
6. Be comprehensive but concise
7. Professional tone

Create complete, ready-to-use content.";

/// Review checklist of the QA worker
pub const QA_CHECKLIST: &str = "Provide a comprehensive QA review including:

1. **Completeness Check** - Does it fully address the task?
2. **Accuracy Check** - Are facts correct? Any logical errors?
3. **Quality Check** - Is it well-structured, clear and professional?
4. **Issues Found** - List each problem on its own line starting with 'Issue:' and give a severity (Critical/Major/Minor)
5. **Recommendations** - Specific improvements needed
6. **Final Assessment** - Pass/Needs Revision/Fail and an overall quality score (1-10)

Be thorough and specific.";

/// Closing instructions of the synthesis request
pub const SYNTHESIS_GUIDELINES: &str = "Provide a well-structured, cohesive response that:
1. Directly addresses the user's task
2. Integrates information from all workers
3. Maintains a clear and professional tone
4. Includes relevant details and citations where applicable";
