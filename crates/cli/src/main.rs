//! Hostkit CLI - close-on-exec sockets and logged shell commands
//! Composition root: logging, configuration, exit classification

mod logging;
mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::os::fd::AsRawFd;
use std::path::PathBuf;
use tracing::{error, info};

use hostkit_core::domain::{
    BlockOption, SocketDomain, SocketKind, SocketProtocol, SocketRequest,
};
use hostkit_core::execute_command;
use hostkit_core::port::{ExecutorConfig, SocketError, SocketFactory, TruncationPolicy};
use hostkit_core::ExitCode;
use hostkit_infra_system::{
    default_socket_factory, inspect_descriptor, FcntlSocketFactory, ShellCommandExecutor,
};

use logging::LogFormat;
use report::SocketReport;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "hostkit")]
#[command(about = "Hostkit POSIX host utilities", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log output format
    #[arg(long, env = "HOSTKIT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a close-on-exec socket and report its descriptor flags
    Socket {
        /// Address family (inet, inet6, unix, netlink, packet, or an AF_* number)
        #[arg(long, default_value = "inet")]
        family: SocketDomain,

        /// Socket type (stream, datagram, seqpacket, raw)
        #[arg(long = "type", default_value = "stream")]
        kind: SocketKind,

        /// Protocol (default, tcp, udp, icmp, icmpv6, netlink-route, netlink-uevent, eth-all)
        #[arg(long, default_value = "default")]
        protocol: SocketProtocol,

        /// Request a non-blocking descriptor
        #[arg(long)]
        non_blocking: bool,

        /// Creation strategy
        #[arg(long, value_enum, default_value_t = Variant::Platform)]
        variant: Variant,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a shell command, logging each line it prints
    Exec {
        /// Shell used as `<shell> -c <command>` (overrides HOSTKIT_SHELL)
        #[arg(long)]
        shell: Option<PathBuf>,

        /// Refuse over-long command lines instead of truncating them
        #[arg(long)]
        strict: bool,

        /// Command words, joined with spaces
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Variant {
    /// Strategy compiled in for this platform
    Platform,
    /// SOCK_CLOEXEC in the socket() call
    Atomic,
    /// socket() then fcntl()
    Fcntl,
}

impl Variant {
    fn factory(self) -> Result<Box<dyn SocketFactory>> {
        match self {
            Variant::Platform => Ok(Box::new(default_socket_factory())),
            Variant::Fcntl => Ok(Box::new(FcntlSocketFactory)),
            Variant::Atomic => atomic_factory(),
        }
    }
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
fn atomic_factory() -> Result<Box<dyn SocketFactory>> {
    Ok(Box::new(hostkit_infra_system::AtomicSocketFactory))
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
fn atomic_factory() -> Result<Box<dyn SocketFactory>> {
    anyhow::bail!("SOCK_CLOEXEC is not available on this platform; use --variant fcntl")
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_format) {
        eprintln!("{} failed to initialise logging: {:#}", "✗".red(), e);
    }

    info!("Hostkit v{} starting...", VERSION);

    let code = match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            if let Some(code) = fatal_exit_code(&err) {
                die(code, &err);
            }
            eprintln!("{} {:#}", "✗".red().bold(), err);
            ExitCode::Failure
        }
    };

    std::process::exit(code.as_i32());
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Socket {
            family,
            kind,
            protocol,
            non_blocking,
            variant,
            json,
        } => {
            let block_option = if non_blocking {
                BlockOption::NonBlock
            } else {
                BlockOption::Block
            };
            let request =
                SocketRequest::new(family, kind, protocol).with_block_option(block_option);
            create_socket(variant, request, json)
        }

        Commands::Exec {
            shell,
            strict,
            command,
        } => {
            let mut config = ExecutorConfig::from_env().context("Invalid executor configuration")?;
            if let Some(shell) = shell {
                config.shell = shell;
            }
            if strict {
                config.truncation = TruncationPolicy::Reject;
            }
            Ok(exec_command(config, &command.join(" ")))
        }
    }
}

fn create_socket(variant: Variant, request: SocketRequest, json: bool) -> Result<ExitCode> {
    let factory = variant.factory()?;
    let fd = factory
        .create(&request)
        .with_context(|| format!("Failed to create {} socket", request))?;
    let flags = inspect_descriptor(&fd).context("Failed to read descriptor flags")?;

    let report = SocketReport::new(factory.name(), request, fd.as_raw_fd(), flags);
    report.print(json)?;

    Ok(if report.ok {
        ExitCode::Success
    } else {
        ExitCode::Failure
    })
}

fn exec_command(config: ExecutorConfig, command: &str) -> ExitCode {
    let executor = ShellCommandExecutor::with_tracing(config);

    match execute_command!(executor, "{}", command) {
        Ok(outcome) => {
            println!(
                "{} Command succeeded ({} output lines)",
                "✓".green().bold(),
                outcome.lines
            );
            ExitCode::Success
        }
        Err(e) => {
            println!("{} Command failed: {}", "✗".red().bold(), e);
            ExitCode::Failure
        }
    }
}

/// Exit classification for errors that must end the process
fn fatal_exit_code(err: &anyhow::Error) -> Option<ExitCode> {
    err.downcast_ref::<SocketError>()
        .and_then(SocketError::exit_code)
}

fn die(code: ExitCode, err: &anyhow::Error) -> ! {
    error!(
        exit_code = code.as_i32(),
        classification = %code,
        error = %format!("{:#}", err),
        "Unrecoverable error, exiting"
    );
    std::process::exit(code.as_i32())
}
