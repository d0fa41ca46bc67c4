mod api;
mod export;
mod gate;
mod poster;
mod session;

use std::env;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;

use api::ApiClient;
use export::{LocalSave, RemoteUpload};
use gate::ExportDecision;
use poster::VideoInfo;
use session::Session;

fn api_base() -> String {
    env::var("POSTERFORGE_API").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

fn anonymous_client() -> Result<ApiClient> {
    Ok(ApiClient::new(api_base(), None)?)
}

/// Client + session for commands that need a logged-in user.
fn authed_client() -> Result<(ApiClient, Session)> {
    let sess = session::load()?
        .context("not logged in; run `posterforge login <email> <password>` first")?;
    let client = ApiClient::new(api_base(), Some(sess.token.clone()))?;
    Ok((client, sess))
}

fn usage() {
    eprintln!("PosterForge - turn a YouTube link into a printable poster");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  posterforge register <name> <email> <password>");
    eprintln!("  posterforge login <email> <password>");
    eprintln!("  posterforge logout");
    eprintln!("  posterforge generate <youtube-url>");
    eprintln!("  posterforge remix");
    eprintln!("  posterforge export [out-dir]");
    eprintln!("  posterforge upgrade [out-dir]");
    eprintln!("  posterforge gallery");
    eprintln!("  posterforge status");
}

fn main() -> Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("register") => register(&args[2..]),
        Some("login") => login(&args[2..]),
        Some("logout") => logout(),
        Some("generate") => generate(&args[2..]),
        Some("remix") => remix(),
        Some("export") => export_cmd(&args[2..]),
        Some("upgrade") => upgrade(&args[2..]),
        Some("gallery") => gallery(),
        Some("status") => status(),
        _ => {
            usage();
            Ok(())
        }
    }
}

fn register(args: &[String]) -> Result<()> {
    let [name, email, password] = args else {
        bail!("usage: posterforge register <name> <email> <password>");
    };

    anonymous_client()?.register(name, email, password)?;
    println!("Account created. Log in with `posterforge login {email} <password>`.");
    Ok(())
}

fn login(args: &[String]) -> Result<()> {
    let [email, password] = args else {
        bail!("usage: posterforge login <email> <password>");
    };

    let response = anonymous_client()?.login(email, password)?;
    let premium = response.user.is_premium;
    let name = response.user.name.clone();

    session::save(&Session {
        token: response.token,
        user: response.user,
        current: None,
    })?;

    if premium {
        println!("Welcome back, {name} (premium).");
    } else {
        println!("Welcome back, {name}.");
    }
    Ok(())
}

fn logout() -> Result<()> {
    session::clear()?;
    println!("Logged out.");
    Ok(())
}

fn generate(args: &[String]) -> Result<()> {
    let [url] = args else {
        bail!("usage: posterforge generate <youtube-url>");
    };

    let (client, mut sess) = authed_client()?;
    let response = client.video_info(url)?;
    let info = VideoInfo::from_response(response, url);
    info!("generated poster data for {url}");

    print_poster(&info);
    sess.current = Some(info);
    session::save(&sess)?;

    println!("Poster ready. `posterforge remix` reshuffles it, `posterforge export` saves it.");
    Ok(())
}

fn remix() -> Result<()> {
    let (_, mut sess) = authed_client()?;
    let current = sess
        .current
        .as_ref()
        .context("generate a poster before remixing")?;

    let remixed = poster::remix(current);
    print_poster(&remixed);
    sess.current = Some(remixed);
    session::save(&sess)?;
    Ok(())
}

fn export_cmd(args: &[String]) -> Result<()> {
    let (client, sess) = authed_client()?;
    let info = sess
        .current
        .as_ref()
        .context("generate a poster before exporting")?;

    // Gate on the persisted flag, not the session file
    match gate::authorize_export(&client)? {
        ExportDecision::Proceed => run_export(&client, info, out_dir(args)),
        ExportDecision::Upgrade => {
            println!("Export is a premium feature.");
            println!("Run `posterforge upgrade` to unlock it and export this poster.");
            Ok(())
        }
    }
}

/// Upgrade to premium, then go straight into the export that prompted it.
fn upgrade(args: &[String]) -> Result<()> {
    let (client, mut sess) = authed_client()?;

    let user = client.upgrade()?;
    println!("Premium upgrade successful!");
    sess.user = user;
    session::save(&sess)?;

    match &sess.current {
        Some(info) => run_export(&client, info, out_dir(args)),
        None => Ok(()),
    }
}

fn gallery() -> Result<()> {
    let (client, _) = authed_client()?;
    let posters = client.posters()?;

    if posters.is_empty() {
        println!("No posters uploaded yet.");
        return Ok(());
    }
    for url in posters {
        println!("{url}");
    }
    Ok(())
}

fn status() -> Result<()> {
    let (_, sess) = authed_client()?;
    println!("Logged in as {} <{}>", sess.user.name, sess.user.email);

    match &sess.current {
        Some(info) => print_poster(info),
        None => println!("No poster generated yet."),
    }
    Ok(())
}

fn out_dir(args: &[String]) -> &Path {
    args.first().map(String::as_str).unwrap_or(".").as_ref()
}

fn print_poster(info: &VideoInfo) {
    println!("Title:     {}", poster::display_title(info));
    println!("Thumbnail: {}", info.thumbnail_url);
    println!("Palette:   {}", info.colors.join(" "));
}

/// Run the export and report both halves separately: a failed upload must
/// not read as a failed save.
fn run_export(client: &ApiClient, info: &VideoInfo, out_dir: &Path) -> Result<()> {
    let outcome = export::export(client, info, out_dir)?;

    match (&outcome.local, &outcome.upload) {
        (LocalSave::Saved(path), RemoteUpload::Uploaded(url)) => {
            println!("Poster saved to {} and uploaded to {url}", path.display());
            Ok(())
        }
        (LocalSave::Saved(path), RemoteUpload::Failed(e)) => {
            println!(
                "Poster saved to {}, but the upload failed: {e}",
                path.display()
            );
            Ok(())
        }
        (LocalSave::Failed(e), RemoteUpload::Uploaded(url)) => {
            println!("Local save failed ({e}), but the poster was uploaded to {url}");
            Ok(())
        }
        (LocalSave::Failed(save_err), RemoteUpload::Failed(upload_err)) => {
            bail!("export failed entirely: save: {save_err}; upload: {upload_err}")
        }
    }
}
