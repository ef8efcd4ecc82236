//! Socket Factory Tests
//!
//! Close-on-exec and non-blocking behaviour checked against the real OS,
//! including what a child process actually inherits across exec.

use hostkit_core::domain::{BlockOption, SocketDomain, SocketKind, SocketProtocol, SocketRequest};
use hostkit_core::port::{SocketError, SocketFactory};
use hostkit_infra_system::{
    default_socket_factory, inspect_descriptor, socket_with_close_exec, FcntlSocketFactory,
};
use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use std::os::fd::AsRawFd;
use std::process::Command;

fn all_factories() -> Vec<Box<dyn SocketFactory>> {
    let mut factories: Vec<Box<dyn SocketFactory>> = vec![
        Box::new(default_socket_factory()),
        Box::new(FcntlSocketFactory),
    ];
    #[cfg(target_os = "linux")]
    factories.push(Box::new(hostkit_infra_system::AtomicSocketFactory));
    factories
}

fn requests() -> Vec<SocketRequest> {
    vec![
        SocketRequest::new(SocketDomain::Inet, SocketKind::Stream, SocketProtocol::Tcp),
        SocketRequest::new(SocketDomain::Inet, SocketKind::Datagram, SocketProtocol::Udp),
        SocketRequest::new(SocketDomain::Inet, SocketKind::Stream, SocketProtocol::Default),
        SocketRequest::new(SocketDomain::Unix, SocketKind::Stream, SocketProtocol::Default),
        SocketRequest::new(SocketDomain::Unix, SocketKind::Datagram, SocketProtocol::Default),
    ]
}

/// Every produced descriptor is close-on-exec, blocking or not
#[test]
fn test_close_on_exec_always_set() {
    for factory in all_factories() {
        for request in requests() {
            for block_option in [BlockOption::Block, BlockOption::NonBlock] {
                let request = request.with_block_option(block_option);
                let fd = factory
                    .create(&request)
                    .unwrap_or_else(|e| panic!("{}: {} failed: {}", factory.name(), request, e));

                let flags = inspect_descriptor(&fd).unwrap();
                assert!(
                    flags.satisfies(block_option),
                    "{}: {} produced {:?}",
                    factory.name(),
                    request,
                    flags
                );
            }
        }
    }
}

/// Forced creation failure yields an error, never a descriptor
#[test]
fn test_create_failure_returns_error() {
    for factory in all_factories() {
        let err = factory
            .create(&SocketRequest::new(
                SocketDomain::Unix,
                SocketKind::Stream,
                SocketProtocol::Udp,
            ))
            .unwrap_err();
        assert!(matches!(err, SocketError::Create { .. }), "{}", factory.name());
        assert!(err.exit_code().is_none());
    }
}

/// A child started with exec does not see the descriptor, whichever factory made it
#[test]
fn test_descriptor_not_inherited_across_exec() {
    for factory in all_factories() {
        for block_option in [BlockOption::Block, BlockOption::NonBlock] {
            let request =
                SocketRequest::new(SocketDomain::Inet, SocketKind::Datagram, SocketProtocol::Udp)
                    .with_block_option(block_option);
            let fd = factory.create(&request).unwrap();
            let raw = fd.as_raw_fd();

            // Child checks whether the descriptor number is open in its own table
            let status = Command::new("/bin/sh")
                .arg("-c")
                .arg(format!("test -e /dev/fd/{raw}"))
                .status()
                .unwrap();
            assert!(
                !status.success(),
                "{}: fd {raw} leaked into the child",
                factory.name()
            );
        }
    }
}

/// Netlink families and protocols reach socket() unchanged
#[cfg(target_os = "linux")]
#[test]
fn test_netlink_route_socket_passes_through() {
    let request =
        SocketRequest::new(SocketDomain::Netlink, SocketKind::Raw, SocketProtocol::NetlinkRoute);
    for factory in all_factories() {
        let fd = factory
            .create(&request)
            .unwrap_or_else(|e| panic!("{}: {} failed: {}", factory.name(), request, e));
        assert!(inspect_descriptor(&fd).unwrap().close_on_exec);
    }
}

/// A raw numeric family is handed to socket() as-is
#[test]
fn test_numeric_domain_passes_through() {
    let request = SocketRequest::new(
        SocketDomain::Other(nix::libc::AF_UNIX),
        SocketKind::Stream,
        SocketProtocol::Default,
    );
    for factory in all_factories() {
        let fd = factory.create(&request).unwrap();
        assert!(inspect_descriptor(&fd).unwrap().close_on_exec, "{}", factory.name());
    }
}

/// Clearing FD_CLOEXEC by hand is visible to inspect_descriptor
#[test]
fn test_inspect_reflects_manual_flag_change() {
    let fd = socket_with_close_exec(
        SocketDomain::Unix,
        SocketKind::Stream,
        SocketProtocol::Default,
        BlockOption::Block,
    )
    .unwrap();

    fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::empty())).unwrap();

    let flags = inspect_descriptor(&fd).unwrap();
    assert!(!flags.close_on_exec);
    assert!(!flags.non_blocking);
}
