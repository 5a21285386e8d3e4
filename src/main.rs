#![allow(clippy::needless_return)]

use std::{env, fs, path::PathBuf, thread, time::Duration};

use anyhow::{Context, Result, bail};
use chrono::Local;

use tether::core::{
    AccessState, DEFAULT_PROFILE_NAME, IgnoreSet, LoadConfig, LoadSignals, ProgressEvent,
    ProgressPhase, ProgressSink, build_context_blob, collapse_consecutive_blank_lines,
    collect_all_files, collect_selected_files, ensure_store_dirs, last_used_profile, run_startup,
    scan_profile_roots, selection_map,
};

struct CliArgs {
    profile: Option<String>,
    to_file: bool,
    wait: bool,
}

fn parse_args() -> Result<CliArgs> {
    let mut parsed = CliArgs {
        profile: None,
        to_file: false,
        wait: false,
    };

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--to-file" => parsed.to_file = true,
            "--wait" => parsed.wait = true,
            "--help" | "-h" => {
                println!("usage: tether [PROFILE] [--to-file] [--wait]");
                println!();
                println!("  PROFILE    profile to load (default: last used)");
                println!("  --to-file  write the output to a temp file instead of the clipboard");
                println!("  --wait     wait much longer for slow network folders");
                std::process::exit(0);
            }
            other if other.starts_with('-') => bail!("unknown option '{other}'"),
            other => parsed.profile = Some(other.to_string()),
        }
    }

    Ok(parsed)
}

fn main() -> Result<()> {
    init_logging();

    let args = parse_args()?;

    let store_root = store_root()?;
    ensure_store_dirs(&store_root).context("creating profile store")?;

    let requested = args
        .profile
        .or_else(|| last_used_profile(&store_root))
        .unwrap_or_else(|| DEFAULT_PROFILE_NAME.to_string());

    let cfg = if args.wait {
        LoadConfig {
            overall_timeout: Duration::from_secs(3600),
            folder_timeout: Duration::from_secs(600),
            ..LoadConfig::default()
        }
    } else {
        LoadConfig::default()
    };

    // Progress events stream from the loader (and its probe workers) in
    // emission order; a printer thread plays the role the GUI dialog has.
    let (sink, rx) = ProgressSink::channel();
    let printer = thread::spawn(move || {
        for ev in rx {
            render_event(&ev);
        }
    });

    let signals = LoadSignals::new();
    let outcome = run_startup(&store_root, &requested, &cfg, &signals, &sink);
    drop(sink);
    let _ = printer.join();

    if let Some(failed) = &outcome.fell_back_from {
        eprintln!(
            "Profile '{failed}' could not be loaded; using '{}' instead.",
            outcome.profile.name
        );
        eprintln!("Run `tether {failed}` to retry the original profile.");
    }
    for rf in outcome.profile.warning_folders() {
        eprintln!(
            "warning: folder {}: {}",
            access_label(rf.access.state),
            rf.path
        );
    }

    let profile = &outcome.profile;
    let ignores = IgnoreSet::compile(&profile.ignore_patterns);
    let roots = scan_profile_roots(profile, &ignores);
    if roots.is_empty() {
        eprintln!(
            "Profile '{}' has no usable root folders; nothing to export.",
            profile.name
        );
        return Ok(());
    }

    let explicit = selection_map(profile);
    let files = if explicit.is_empty() {
        collect_all_files(&roots)
    } else {
        collect_selected_files(&roots, &explicit)
    };

    let blob = collapse_consecutive_blank_lines(&build_context_blob(profile, &roots, &files));
    eprintln!(
        "{} files • {} chars • {} tokens",
        files.len(),
        blob.chars().count(),
        count_tokens(&blob)
    );

    if !args.to_file && copy_to_clipboard(&blob) {
        eprintln!("Copied to clipboard.");
        return Ok(());
    }

    let path = write_temp_file(&blob)?;
    println!("{}", path.display());
    Ok(())
}

/* ================================ Plumbing ================================= */

fn init_logging() {
    let config = simplelog::ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .build();
    let _ = simplelog::TermLogger::init(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
}

fn store_root() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("tether"))
        .context("could not determine a config directory")
}

fn render_event(ev: &ProgressEvent) {
    let msg = ev.message.as_deref().unwrap_or("");
    match ev.phase {
        ProgressPhase::ScanningFolder => match ev.progress {
            Some((cur, total)) => eprintln!("[{cur}/{total}] {msg}"),
            None => eprintln!("    {msg}"),
        },
        ProgressPhase::Error => eprintln!("error: {msg}"),
        _ => eprintln!("{msg}"),
    }
}

const fn access_label(state: AccessState) -> &'static str {
    match state {
        AccessState::Untested => "untested",
        AccessState::Ok => "ok",
        AccessState::Timeout => "timed out",
        AccessState::Inaccessible => "inaccessible",
    }
}

fn write_temp_file(text: &str) -> Result<PathBuf> {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = env::temp_dir().join(format!("tether_{stamp}.txt"));
    fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

#[cfg(feature = "clipboard")]
fn copy_to_clipboard(text: &str) -> bool {
    let mut ok = false;
    if let Ok(mut cb) = arboard::Clipboard::new() {
        ok = cb.set_text(text).is_ok();
    }
    if !ok {
        log::warn!("clipboard unavailable, falling back to a temp file");
    }
    ok
}

#[cfg(not(feature = "clipboard"))]
fn copy_to_clipboard(_text: &str) -> bool {
    false
}

/* ============================ Token counting ============================ */

#[cfg(feature = "tokens")]
fn count_tokens(text: &str) -> usize {
    use std::sync::OnceLock;
    use tiktoken_rs::{CoreBPE, o200k_base};
    static BPE: OnceLock<CoreBPE> = OnceLock::new();
    let bpe = BPE.get_or_init(|| o200k_base().expect("failed to load o200k_base BPE"));
    bpe.encode_with_special_tokens(text).len()
}

#[cfg(not(feature = "tokens"))]
fn count_tokens(text: &str) -> usize {
    text.split_whitespace().filter(|s| !s.is_empty()).count()
}
