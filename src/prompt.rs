use crate::path::HOME_DIR;

const USER_HOST: &str = "guest@machine";

/// Shell prompt for a session sitting in `current_dir`.
pub fn generate_prompt(current_dir: &str) -> String {
    match current_dir {
        HOME_DIR => format!("{}:~$ ", USER_HOST),
        "" => format!("{}:/$ ", USER_HOST),
        dir => format!("{}:/{}$ ", USER_HOST, dir.trim_start_matches('/')),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_prompt() {
        assert_eq!(generate_prompt("home/guest"), "guest@machine:~$ ");
        assert_eq!(generate_prompt(""), "guest@machine:/$ ");
        assert_eq!(generate_prompt("home/zorcal/projects"), "guest@machine:/home/zorcal/projects$ ");
    }
}
