//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use content_studio_domain::{PostFormat, Tone};
use std::path::PathBuf;

/// content-studio: write, refine and research social-media posts with Gemini
#[derive(Parser, Debug)]
#[command(name = "content-studio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a single post
    Tweet(PostArgs),

    /// Write a thread, optionally refining it afterwards
    Thread(ThreadArgs),

    /// Fix spelling and grammar of a thread
    Proofread(ProofreadArgs),

    /// Rewrite a post keeping its message
    Regenerate(RegenerateArgs),

    /// Summarize a URL, a file or a web search
    Summarize(SummarizeArgs),

    /// Grounded web search, post search and trending topics
    Search(SearchArgs),

    /// Generate an image
    Image(ImageArgs),

    /// Edit an image with an instruction
    EditImage(EditImageArgs),

    /// Generate a video and store it locally
    Video(VideoArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct PostArgs {
    /// Topic or instructions for the post
    pub prompt: String,

    /// Tone preset (authority, storytelling, analytical, conversational, inspirational)
    #[arg(long)]
    pub tone: Option<Tone>,

    /// Format preset (announcement, listicle, how_to, question, quick_tip, support_statement)
    #[arg(long)]
    pub format: Option<PostFormat>,

    /// Target audience
    #[arg(long)]
    pub audience: Option<String>,

    /// Keywords to weave in
    #[arg(long)]
    pub keywords: Option<String>,

    /// Ground the post on this source URL
    #[arg(long)]
    pub source_url: Option<String>,

    /// Title of the source URL
    #[arg(long, requires = "source_url")]
    pub source_title: Option<String>,

    /// Attach a file (PDF, image, text) as context
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Let the model search the web
    #[arg(long)]
    pub web_search: bool,

    /// Ignore the brand voice from configuration
    #[arg(long)]
    pub no_brand_voice: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ThreadArgs {
    #[command(flatten)]
    pub post: PostArgs,

    /// Refinement instruction applied after generation; repeat to chain
    #[arg(long)]
    pub refine: Vec<String>,

    /// Proofread the final thread
    #[arg(long)]
    pub proofread: bool,
}

#[derive(Args, Debug)]
pub struct ProofreadArgs {
    /// Posts of the thread, in order
    #[arg(required_unless_present = "file")]
    pub posts: Vec<String>,

    /// File with one post per line (use - for stdin)
    #[arg(long, conflicts_with = "posts")]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RegenerateArgs {
    /// Post to rewrite
    pub text: String,
}

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    #[command(subcommand)]
    pub command: SummarizeCommands,
}

#[derive(Subcommand, Debug)]
pub enum SummarizeCommands {
    /// Summarize the content behind a URL
    Url {
        url: String,
    },

    /// Summarize a local file
    File {
        path: PathBuf,

        /// Override the detected MIME type
        #[arg(long)]
        mime_type: Option<String>,
    },

    /// Summarize what the web says about a query
    Search {
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    #[command(subcommand)]
    pub command: SearchCommands,
}

#[derive(Subcommand, Debug)]
pub enum SearchCommands {
    /// Grounded web search
    Web {
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find recent posts about a query
    Posts {
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Current trending topics
    Trends {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Image description
    pub prompt: String,

    /// Aspect ratio forwarded to the model, e.g. 1:1, 16:9, 9:16
    #[arg(long, default_value = "1:1")]
    pub aspect_ratio: String,

    /// Write the image to this path
    #[arg(long, short)]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct EditImageArgs {
    /// Image to edit
    pub input: PathBuf,

    /// What to change
    #[arg(long)]
    pub instruction: String,

    /// Write the edited image to this path
    #[arg(long, short)]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct VideoArgs {
    /// Video description
    pub prompt: String,

    /// Visual style, e.g. cinematic
    #[arg(long)]
    pub style: Option<String>,

    /// Reference image for the first frame
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Override the wait budget in seconds (0 waits indefinitely)
    #[arg(long)]
    pub max_wait_secs: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
