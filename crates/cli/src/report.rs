//! Socket report printed by `hostkit socket`

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::os::fd::RawFd;

use hostkit_core::domain::{DescriptorFlags, SocketRequest};

#[derive(Debug, Serialize)]
pub struct SocketReport {
    pub variant: &'static str,
    pub request: SocketRequest,
    pub fd: RawFd,
    pub flags: DescriptorFlags,
    /// Flags match what was requested
    pub ok: bool,
}

impl SocketReport {
    pub fn new(
        variant: &'static str,
        request: SocketRequest,
        fd: RawFd,
        flags: DescriptorFlags,
    ) -> Self {
        Self {
            variant,
            request,
            fd,
            flags,
            ok: flags.satisfies(request.block_option),
        }
    }

    pub fn print(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }

        let headline = format!("Socket {} created (fd {})", self.request, self.fd);
        if self.ok {
            println!("{} {}", "✓".green().bold(), headline.green().bold());
        } else {
            println!("{} {}", "✗".red().bold(), headline.red().bold());
        }
        println!("  {} {}", "Variant:".bold(), self.variant);
        println!("  {} {}", "Close-on-exec:".bold(), yes_no(self.flags.close_on_exec));
        println!("  {} {}", "Non-blocking:".bold(), yes_no(self.flags.non_blocking));
        Ok(())
    }
}

fn yes_no(value: bool) -> colored::ColoredString {
    if value {
        "yes".green()
    } else {
        "no".yellow()
    }
}
