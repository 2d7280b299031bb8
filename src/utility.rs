//! Utilities
use log::*;
use std::{env, fs, collections::HashMap, io::Write, path::PathBuf, time::Duration};
use anyhow::{Result, Context};
use regex::Regex;

use crate::{DEFAULT_LISTEN, DEFAULT_INTERVAL, HTTP_TIMEOUT_SECONDS};

pub fn http_get(
    hostname_port: &str,
    url: &str,
) -> Result<String>
{
    let data_from_web_request = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
        .build()
        .with_context(|| "Error building http client")?
        .get(format!("http://{}/{}", hostname_port, url))
        .send()
        .with_context(|| format!("Error requesting http://{}/{}", hostname_port, url))?;

    if !data_from_web_request.status().is_success()
    {
        debug!("Non success response: {}/{} = {}", hostname_port, url, data_from_web_request.status());
        anyhow::bail!("Non success response: {}/{} = {}", hostname_port, url, data_from_web_request.status());
    }
    debug!("Success response: {}/{} = {}", hostname_port, url, data_from_web_request.status());
    data_from_web_request.text()
        .with_context(|| format!("Error reading body of http://{}/{}", hostname_port, url))
}

pub fn set_listen(
    option: &Option<String>,
    changed_options: &mut HashMap<&str, String>,
) -> String
{
    // is --listen set?
    let listen = if let Some(listen) = option {
        info!("listen argument set: using: {}", listen);
        changed_options.insert("GROWTHZ_LISTEN", listen.to_string());
        listen.to_string()
    } else {
        // is the environment variable GROWTHZ_LISTEN set (via dotenv().ok())?
        match env::var("GROWTHZ_LISTEN") {
            Ok(set_var) => {
                info!("listen not set: set via .env: GROWTHZ_LISTEN: {}", set_var);
                changed_options.insert("GROWTHZ_LISTEN", set_var.to_owned());
                set_var
            }
            Err(_e) => {
                info!("listen not set: and not set via .env: using DEFAULT_LISTEN: {}", DEFAULT_LISTEN);
                DEFAULT_LISTEN.to_string()
            }
        }
    };
    // PORT is what hosting platforms set, it only replaces the port.
    match env::var("PORT") {
        Ok(port) => {
            info!("PORT set: using port: {}", port);
            replace_port(&listen, &port)
        }
        Err(_e) => listen,
    }
}

fn replace_port(
    listen: &str,
    port: &str,
) -> String
{
    match listen.rsplit_once(':') {
        Some((host, _)) => format!("{}:{}", host, port),
        None => format!("{}:{}", listen, port),
    }
}

pub fn set_session_dir(
    option: &Option<PathBuf>,
    changed_options: &mut HashMap<&str, String>,
) -> Option<PathBuf>
{
    // is --session-dir set?
    if let Some(session_dir) = option {
        info!("session-dir argument set: using: {}", session_dir.display());
        changed_options.insert("GROWTHZ_SESSION_DIR", session_dir.display().to_string());
        return Some(session_dir.clone());
    }
    match env::var("GROWTHZ_SESSION_DIR") {
        Ok(set_var) => {
            info!("session-dir not set: set via .env: GROWTHZ_SESSION_DIR: {}", set_var);
            changed_options.insert("GROWTHZ_SESSION_DIR", set_var.to_owned());
            Some(PathBuf::from(set_var))
        }
        Err(_e) => {
            info!("session-dir not set: and not set via .env: sessions are kept in memory");
            None
        }
    }
}

pub fn set_interval(
    option: &Option<u64>,
    changed_options: &mut HashMap<&str, String>,
) -> Result<u64>
{
    // is --interval set?
    if let Some(interval) = option {
        info!("interval argument set: using: {}", interval);
        changed_options.insert("GROWTHZ_INTERVAL", interval.to_string());
        return Ok(*interval);
    }
    match env::var("GROWTHZ_INTERVAL") {
        Ok(set_var) => {
            info!("interval not set: set via .env: GROWTHZ_INTERVAL: {}", set_var);
            changed_options.insert("GROWTHZ_INTERVAL", set_var.to_owned());
            set_var.parse()
                .with_context(|| format!("GROWTHZ_INTERVAL is not a number: {}", set_var))
        }
        Err(_e) => {
            info!("interval not set: and not set via .env: using DEFAULT_INTERVAL: {}", DEFAULT_INTERVAL);
            Ok(DEFAULT_INTERVAL)
        }
    }
}

pub fn set_regex(
    regex: &Option<String>,
) -> Result<Regex>
{
    match regex {
        Some(regex) => Regex::new(regex.as_str())
            .with_context(|| format!("Invalid regex: {}", regex)),
        None => Ok(Regex::new(".*")?),
    }
}

pub fn dotenv_writer(
    write_dotenv: bool,
    changed_options: HashMap<&str, String>,
) -> Result<()>
{
    if !changed_options.is_empty() && write_dotenv {
        info!("Writing .env file");
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(".env")
            .with_context(|| "Error writing .env file: .env")?;

        for (key, value) in changed_options {
            file.write_all(format!("{}={}\n", key, value).as_bytes())?;
            info!("{}={}", key, value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_replace_port() {
        assert_eq!(replace_port("0.0.0.0:5000", "8080"), "0.0.0.0:8080");
        assert_eq!(replace_port("[::1]:5000", "8080"), "[::1]:8080");
        assert_eq!(replace_port("localhost", "8080"), "localhost:8080");
    }
    #[test]
    fn unit_set_regex() {
        assert!(set_regex(&None).unwrap().is_match("anything::At::All"));
        let regex = set_regex(&Some("^growthz::".to_string())).unwrap();
        assert!(regex.is_match("growthz::leak::Leaker"));
        assert!(!regex.is_match("alloc::string::String"));
        assert!(set_regex(&Some("(".to_string())).is_err());
    }
    #[test]
    fn unit_set_session_dir_argument_wins() {
        let mut changed_options = HashMap::new();
        let session_dir = set_session_dir(&Some(PathBuf::from("/tmp/sessions")), &mut changed_options);
        assert_eq!(session_dir, Some(PathBuf::from("/tmp/sessions")));
        assert_eq!(changed_options["GROWTHZ_SESSION_DIR"], "/tmp/sessions");
    }
    #[test]
    fn unit_set_interval_argument_wins() {
        let mut changed_options = HashMap::new();
        assert_eq!(set_interval(&Some(11), &mut changed_options).unwrap(), 11);
        assert_eq!(changed_options["GROWTHZ_INTERVAL"], "11");
    }
}
