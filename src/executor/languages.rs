use tokio::process::Command;

/// The fixed set of toolchains the service knows how to invoke. Anything
/// outside this set is rejected before any file is written or process
/// spawned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    Javascript,
    Python,
    Cpp,
    Java,
}

impl Language {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "javascript" => Some(Self::Javascript),
            "python" => Some(Self::Python),
            "cpp" => Some(Self::Cpp),
            "java" => Some(Self::Java),
            _ => None,
        }
    }

    /// Name of the staged source file inside the working area, `None` when
    /// the interpreter takes the source text inline.
    pub fn source_file(&self) -> Option<&'static str> {
        match self {
            Self::Javascript => None,
            Self::Python => Some("code.py"),
            Self::Cpp => Some("code.cpp"),
            // javac requires the file name to match the public class.
            Self::Java => Some("Main.java"),
        }
    }

    /// Compile step for the compiled languages. Relative paths: every
    /// command runs with the working area as its current directory.
    pub fn compile_command(&self) -> Option<Command> {
        match self {
            Self::Javascript | Self::Python => None,
            Self::Cpp => {
                let mut cmd = Command::new("g++");
                cmd.args(["code.cpp", "-o", "code"]);
                Some(cmd)
            }
            Self::Java => {
                let mut cmd = Command::new("javac");
                cmd.arg("Main.java");
                Some(cmd)
            }
        }
    }

    /// Run step. `code` is only consulted by the inline interpreters.
    pub fn run_command(&self, code: &str) -> Command {
        match self {
            Self::Javascript => {
                let mut cmd = Command::new("node");
                cmd.arg("-e").arg(code);
                cmd
            }
            Self::Python => {
                let mut cmd = Command::new("python3");
                cmd.arg("code.py");
                cmd
            }
            Self::Cpp => Command::new("./code"),
            Self::Java => {
                let mut cmd = Command::new("java");
                cmd.args(["-cp", ".", "Main"]);
                cmd
            }
        }
    }
}
