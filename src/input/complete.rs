//! Static-dictionary command completion.

/// Commands offered for completion by default.
pub const DEFAULT_COMMANDS: &[&str] = &[
    "apt", "apt-get", "awk", "cat", "cd", "chmod", "chown", "clear", "cp", "curl", "df", "diff",
    "docker", "du", "echo", "env", "exit", "export", "find", "free", "git", "grep", "gzip",
    "head", "history", "htop", "hostname", "ifconfig", "ip", "journalctl", "kill", "killall",
    "less", "ln", "ls", "make", "man", "mkdir", "more", "mv", "nano", "netstat", "ping", "ps",
    "pwd", "reboot", "rm", "rmdir", "rsync", "scp", "sed", "service", "shutdown", "sort",
    "ssh", "sudo", "systemctl", "tail", "tar", "top", "touch", "uname", "unzip", "uptime",
    "vi", "vim", "wc", "wget", "which", "whoami", "zip",
];

/// Absolute paths offered after the directory-change command.
pub const COMMON_PATHS: &[&str] = &[
    "/", "/bin", "/boot", "/dev", "/etc", "/home", "/lib", "/media", "/mnt", "/opt", "/proc",
    "/root", "/run", "/sbin", "/srv", "/sys", "/tmp", "/usr", "/usr/bin", "/usr/local",
    "/usr/share", "/var", "/var/log", "/var/www",
];

const CHANGE_DIR: &str = "cd";

/// Prefix completion over a fixed dictionary.
#[derive(Debug, Clone)]
pub struct AutoComplete {
    commands: Vec<String>,
    paths: Vec<String>,
}

impl AutoComplete {
    /// Completer over [`DEFAULT_COMMANDS`] and [`COMMON_PATHS`].
    pub fn new() -> Self {
        Self::with_commands(DEFAULT_COMMANDS.iter().copied())
    }

    /// Completer over a custom command dictionary.
    pub fn with_commands<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
            paths: COMMON_PATHS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Dictionary commands starting with `prefix`, ignoring case, sorted.
    pub fn find_matches(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        let mut matches: Vec<String> = self
            .commands
            .iter()
            .filter(|cmd| cmd.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        matches.sort();
        matches
    }

    /// Complete `input`, returning it unchanged when nothing better exists.
    pub fn complete(&self, input: &str) -> String {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        if let [command, path] = tokens.as_slice() {
            if *command == CHANGE_DIR && path.starts_with('/') {
                return self.complete_path(input, path);
            }
        }

        let trimmed = input.trim();
        let matches = self.find_matches(trimmed);
        match matches.as_slice() {
            [] => input.to_string(),
            [only] => only.clone(),
            many => {
                let prefix = longest_common_prefix(many);
                if prefix.chars().count() > trimmed.chars().count() {
                    prefix
                } else {
                    input.to_string()
                }
            }
        }
    }

    fn complete_path(&self, input: &str, partial: &str) -> String {
        let mut matches = self.paths.iter().filter(|p| p.starts_with(partial));
        match (matches.next(), matches.next()) {
            (Some(path), None) => format!("{} {}", CHANGE_DIR, path),
            _ => input.to_string(),
        }
    }
}

impl Default for AutoComplete {
    fn default() -> Self {
        Self::new()
    }
}

fn longest_common_prefix(strings: &[String]) -> String {
    let Some((first, rest)) = strings.split_first() else {
        return String::new();
    };

    let mut len = first.chars().count();
    for s in rest {
        len = first
            .chars()
            .zip(s.chars())
            .take(len)
            .take_while(|(a, b)| a == b)
            .count();
    }
    first.chars().take(len).collect()
}
