//! Response cache for common command-help queries.
//!
//! Populated once at construction, read-only afterwards, so concurrent
//! lookups need no synchronization. Lookup is pure: normalize, exact match,
//! then a bounded containment heuristic (any whitespace token of the query
//! that equals a known key hits).

use std::collections::HashMap;

pub struct ResponseCache {
    entries: HashMap<String, String>,
}

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

impl ResponseCache {
    /// Cache pre-populated with answers for a handful of everyday commands.
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        for (key, answer) in BUILTIN_ANSWERS {
            entries.insert((*key).to_string(), (*answer).to_string());
        }
        Self { entries }
    }

    /// Extend the built-in mapping with deployment-specific entries.
    pub fn with_entries<I>(extra: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut cache = Self::builtin();
        for (key, answer) in extra {
            cache.entries.insert(normalize(&key), answer);
        }
        cache
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pure lookup; no side effects, no remote calls.
    pub fn lookup(&self, query: &str) -> Option<&str> {
        let normalized = normalize(query);
        if let Some(answer) = self.entries.get(&normalized) {
            return Some(answer);
        }
        normalized
            .split_whitespace()
            .find_map(|token| self.entries.get(token))
            .map(String::as_str)
    }
}

const BUILTIN_ANSWERS: &[(&str, &str)] = &[
    (
        "grep",
        "Explanation: Search lines that match a pattern in files.\n\n\
         Syntax:\n```\ngrep [OPTIONS] PATTERN [FILE...]\n```\n\n\
         Example:\n```\ngrep -R \"error\" /var/log\n```",
    ),
    (
        "tar",
        "Explanation: Create or extract archive files.\n\n\
         Syntax:\n```\ntar -cvf archive.tar DIR\ntar -xvf archive.tar\ntar -xvzf archive.tar.gz\n```\n\n\
         Example:\n```\ntar -xvzf backup.tar.gz -C /home/user/data/\n```",
    ),
    (
        "curl",
        "Explanation: Transfer data to/from a server.\n\n\
         Syntax:\n```\ncurl [OPTIONS] URL\n```\n\n\
         Example:\n```\ncurl -L https://example.com -o page.html\n```",
    ),
    (
        "docker",
        "Explanation: Build and run containers.\n\n\
         Syntax:\n```\ndocker run [OPTIONS] IMAGE [COMMAND] [ARG...]\n```\n\n\
         Example:\n```\ndocker run --rm -it ubuntu:22.04 bash\n```",
    ),
    (
        "kubectl",
        "Explanation: Control Kubernetes clusters.\n\n\
         Syntax:\n```\nkubectl [COMMAND] [TYPE] [NAME] [FLAGS]\n```\n\n\
         Example:\n```\nkubectl get pods -n kube-system\n```",
    ),
    (
        "git",
        "Explanation: Version control system commands.\n\n\
         Syntax:\n```\ngit <command> [options]\n```\n\n\
         Example:\n```\ngit clone https://github.com/user/repo.git\n```",
    ),
];
