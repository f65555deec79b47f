//! Output formatting for the subcommands.

use appcast_core::ReleaseListing;
use appcast_pipe::Pipe;
use std::fmt::Write;

/// Summary printed by `appcast check`.
#[must_use]
pub fn describe_pipe(pipe: &Pipe) -> String {
    let mut out = String::new();
    if pipe.is_empty() {
        out.push_str("No integrations enabled\n");
        return out;
    }

    if let Some(apk) = &pipe.apk {
        let _ = writeln!(out, "apk:");
        let _ = writeln!(out, "  source:     {} ({})", apk.source.kind(), apk.source.location());
        let _ = writeln!(out, "  target:     {} ({})", apk.target.kind(), apk.target.location());
        let _ = writeln!(out, "  version:    {}", apk.version.as_deref().unwrap_or("all"));
        let _ = writeln!(out, "  prerelease: {}", apk.prerelease);
        let _ = writeln!(out, "  key-name:   {}", apk.key_name);
    }
    out
}

/// Listing printed by `appcast releases`.
#[must_use]
pub fn describe_releases(listing: &ReleaseListing) -> String {
    let mut out = String::new();
    if listing.releases.is_empty() {
        out.push_str("No releases found\n");
    }

    for release in &listing.releases {
        let _ = write!(out, "{} ({})", release.version, release.date.format("%Y-%m-%d"));
        if !release.name.is_empty() && release.name != release.version {
            let _ = write!(out, " {}", release.name);
        }
        out.push('\n');
        for asset in &release.assets {
            let _ = writeln!(out, "  {} {} bytes", asset.name, asset.size);
        }
    }

    for warning in &listing.warnings {
        let _ = writeln!(out, "warning: {warning}");
    }
    out
}
