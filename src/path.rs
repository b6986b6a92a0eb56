//! Lexical path handling.
//!
//! Normalized paths never start or end with `/`, and the root is the empty
//! string. Nothing here touches the filesystem.

/// Where `~`, `$HOME` and a bare `cd` land.
pub const HOME_DIR: &str = "home/guest";

/// Collapse `.`, `..` and repeated separators. `..` above the root is
/// dropped, so the result is always a normalized path.
pub fn clean(path: &str) -> String {
    let mut components: Vec<&str> = Vec::new();

    for component in path.split('/') {
        match component {
            // skip empty parts and current dir refs
            "" | "." => continue,
            // parent dir - pop if we can, otherwise we're clamped at root
            ".." => {
                components.pop();
            }
            comp => components.push(comp),
        }
    }

    components.join("/")
}

/// Turn whatever the user typed into a normalized path, relative to
/// `current_dir` unless it starts with `/`.
pub fn resolve(current_dir: &str, target: &str) -> String {
    match target {
        "~" | "$HOME" => return HOME_DIR.to_string(),
        "." => return current_dir.to_string(),
        _ => {}
    }

    if target.starts_with('/') {
        return clean(target);
    }

    if current_dir.is_empty() {
        clean(target)
    } else {
        clean(&format!("{}/{}", current_dir, target))
    }
}

/// Split a normalized path into (parent, leaf). The parent of a top-level
/// entry is the root, `""`.
pub fn split(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// Join a directory and an entry name without producing a leading `/` at root.
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean() {
        assert_eq!(clean("/home/user/../docs"), "home/docs");
        assert_eq!(clean("/home/./user"), "home/user");
        assert_eq!(clean("/home//user/"), "home/user");
        assert_eq!(clean("/home/user/.."), "home");
        assert_eq!(clean("/.."), "");
        assert_eq!(clean("/"), "");
        assert_eq!(clean("."), "");
        assert_eq!(clean("../../x"), "x");
    }

    #[test]
    fn test_resolve_home() {
        assert_eq!(resolve("", "~"), HOME_DIR);
        assert_eq!(resolve("home/zorcal/projects", "$HOME"), HOME_DIR);
    }

    #[test]
    fn test_resolve_dot_keeps_current() {
        assert_eq!(resolve("home/zorcal", "."), "home/zorcal");
        assert_eq!(resolve("", "."), "");
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve("home/zorcal/projects", "../../guest"), "home/guest");
        assert_eq!(resolve("home/zorcal/projects", ".."), "home/zorcal");
        assert_eq!(resolve("home", "./zorcal/../guest/./"), "home/guest");
        assert_eq!(resolve("", "home"), "home");
        assert_eq!(resolve("home/zorcal/projects", "../../../home/zorcal"), "home/zorcal");
    }

    #[test]
    fn test_resolve_clamps_at_root() {
        assert_eq!(resolve("", ".."), "");
        assert_eq!(resolve("home", "../../../.."), "");
        assert_eq!(resolve("home/guest", "/../../home"), "home");
    }

    #[test]
    fn test_resolve_absolute() {
        assert_eq!(resolve("home/guest", "/home/zorcal/../guest"), "home/guest");
        assert_eq!(resolve("home/guest", "/"), "");
        assert_eq!(resolve("home/guest", "//home///zorcal//"), "home/zorcal");
    }

    #[test]
    fn test_resolve_never_has_edge_separators() {
        let dirs = ["", "home", "home/zorcal/projects"];
        let targets = ["a/", "/a/b/", "./", "../x/./", "//", "a//b", "~", "."];
        for dir in dirs {
            for target in targets {
                let got = resolve(dir, target);
                assert!(!got.starts_with('/'), "{:?} + {:?} = {:?}", dir, target, got);
                assert!(!got.ends_with('/'), "{:?} + {:?} = {:?}", dir, target, got);
            }
        }
    }

    #[test]
    fn test_resolve_is_idempotent_under_dot() {
        let dirs = ["", "home", "home/zorcal/projects"];
        let targets = ["..", "../guest", "/home/./zorcal", "x/../../y", "~", "$HOME", "."];
        for dir in dirs {
            for target in targets {
                let once = resolve(dir, target);
                assert_eq!(resolve(&once, "."), once);
            }
        }
    }

    #[test]
    fn test_split_and_join() {
        assert_eq!(split("home/zorcal/.secret.txt"), ("home/zorcal", ".secret.txt"));
        assert_eq!(split("home"), ("", "home"));
        assert_eq!(join("", "home"), "home");
        assert_eq!(join("home", "guest"), "home/guest");
    }
}
