use minishell::builtin::BuiltinCommand;
use minishell::command::{CommandResult, Outcome};
use minishell::env::Environment;
use minishell::{Control, Interpreter, Registry};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};

fn lock_current_dir() -> MutexGuard<'static, ()> {
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Session {
    sh: Interpreter,
}

impl Session {
    fn with_path(path: &str) -> Self {
        Session {
            sh: Interpreter::new(Environment::with_vars([("PATH", path)]), Registry::default()),
        }
    }

    fn new() -> Self {
        Session::with_path("/bin:/usr/bin")
    }

    fn run(&mut self, line: &str) -> (Control, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let control = self.sh.run_line(line, &mut out, &mut err).expect("run_line");
        (
            control,
            String::from_utf8(out).expect("utf8 stdout"),
            String::from_utf8(err).expect("utf8 stderr"),
        )
    }
}

fn quoted(path: &Path) -> String {
    format!("'{}'", path.display())
}

#[cfg(unix)]
fn make_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

#[test]
fn dual_stream_redirection_splits_successes_and_failures() {
    let tmp = tempfile::tempdir().unwrap();
    let present = tmp.path().join("present.txt");
    fs::write(&present, "alpha\nbeta\n").unwrap();
    let missing = tmp.path().join("missing.txt");
    let out_file = tmp.path().join("out.txt");
    let err_file = tmp.path().join("err.txt");

    let (control, out, err) = Session::new().run(&format!(
        "cat {} {} 1> {} 2> {}",
        quoted(&present),
        quoted(&missing),
        quoted(&out_file),
        quoted(&err_file)
    ));

    assert_eq!(control, Control::Continue);
    assert_eq!((out.as_str(), err.as_str()), ("", ""));
    assert_eq!(fs::read_to_string(&out_file).unwrap(), "alpha\nbeta");
    assert_eq!(
        fs::read_to_string(&err_file).unwrap(),
        format!("cat: {}: No such file or directory", missing.display())
    );
}

#[test]
fn per_operand_failure_does_not_hide_other_operands() {
    let tmp = tempfile::tempdir().unwrap();
    let present = tmp.path().join("present.txt");
    fs::write(&present, "content").unwrap();
    let missing = tmp.path().join("missing.txt");

    let (_, out, err) = Session::new().run(&format!(
        "cat {} {}",
        quoted(&missing),
        quoted(&present)
    ));

    assert_eq!(out, "content\n");
    assert_eq!(
        err,
        format!("cat: {}: No such file or directory\n", missing.display())
    );
}

#[test]
fn cat_treats_dash_prefixed_operands_as_files() {
    let _lock = lock_current_dir();
    let orig = std::env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("-x"), "dashed\n").unwrap();
    std::env::set_current_dir(tmp.path()).unwrap();

    let (control, out, err) = Session::new().run("cat -n -x");

    std::env::set_current_dir(orig).unwrap();
    assert_eq!(control, Control::Continue);
    assert_eq!(out, "dashed\n");
    assert_eq!(err, "cat: -n: No such file or directory\n");
}

#[test]
fn redirected_output_matches_streamed_output() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("file with spaces.txt");
    fs::write(&source, "one\ntwo\nthree\n").unwrap();
    let target = tmp.path().join("copy.txt");
    let mut session = Session::new();

    let (_, streamed, _) = session.run(&format!("cat {}", quoted(&source)));
    let (_, out, _) = session.run(&format!("cat {} > {}", quoted(&source), quoted(&target)));

    assert_eq!(out, "");
    let written = fs::read_to_string(&target).unwrap();
    assert_eq!(format!("{written}\n"), streamed);
}

#[test]
fn redirect_truncates_existing_file() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("out.txt");
    fs::write(&target, "a much longer previous content\n").unwrap();

    Session::new().run(&format!("echo short 1> {}", quoted(&target)));

    assert_eq!(fs::read_to_string(&target).unwrap(), "short");
}

#[test]
fn stderr_redirect_leaves_stdout_on_console() {
    let tmp = tempfile::tempdir().unwrap();
    let err_file = tmp.path().join("err.txt");

    let (_, out, err) = Session::new().run(&format!("echo visible 2> {}", quoted(&err_file)));

    assert_eq!(out, "visible\n");
    assert_eq!(err, "");
    assert!(!err_file.exists());
}

#[test]
fn unknown_command_has_no_side_effects() {
    let tmp = tempfile::tempdir().unwrap();
    let out_file = tmp.path().join("out.txt");

    let (control, out, err) =
        Session::new().run(&format!("nonexistent_cmd_77 arg > {}", quoted(&out_file)));

    assert_eq!(control, Control::Continue);
    assert_eq!(out, "");
    assert_eq!(err, "nonexistent_cmd_77: command not found\n");
    assert!(!out_file.exists());
}

#[test]
fn type_distinguishes_builtins_externals_and_unknowns() {
    let tmp = tempfile::tempdir().unwrap();
    let search = tmp.path().to_string_lossy().to_string();
    #[cfg(unix)]
    let tool = make_script(tmp.path(), "my_tool", "echo tool");

    let (_, out, err) = Session::with_path(&search).run("type cd my_tool nothing_here");

    #[cfg(unix)]
    assert_eq!(
        out,
        format!("cd is a shell builtin\nmy_tool is {}\n", tool.display())
    );
    #[cfg(not(unix))]
    let _ = out;
    assert_eq!(err, "nothing_here: not found\n");
}

#[test]
fn exit_status_is_returned_to_the_caller() {
    let mut session = Session::new();
    assert_eq!(session.run("exit 3").0, Control::Exit(3));
    assert_eq!(session.run("exit").0, Control::Exit(0));
    assert_eq!(session.run("exit x1").0, Control::Exit(1));
    assert_eq!(session.run("exit -1").0, Control::Exit(-1));
    assert_eq!(session.run("exit --bogus").0, Control::Exit(1));
}

#[test]
fn cd_failure_keeps_working_directory() {
    let _lock = lock_current_dir();
    let orig = std::env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    let canonical = fs::canonicalize(tmp.path()).unwrap();
    let mut session = Session::new();

    session.run(&format!("cd {}", quoted(&canonical)));
    let (_, err_out, err) = session.run("cd missing_subdir");
    let (_, pwd, _) = session.run("pwd");

    assert_eq!(err_out, "");
    assert_eq!(err, "cd: missing_subdir: No such file or directory\n");
    assert_eq!(pwd, format!("{}\n", canonical.display()));

    std::env::set_current_dir(orig).unwrap();
}

#[test]
#[cfg(unix)]
fn external_program_output_and_failure() {
    let tmp = tempfile::tempdir().unwrap();
    make_script(tmp.path(), "greet", r#"echo "hello, $1""#);
    make_script(tmp.path(), "explode", "echo 'explode: it went wrong' >&2\nexit 4");
    let mut session = Session::with_path(&tmp.path().to_string_lossy());

    let (_, out, err) = session.run("greet 'big world'");
    assert_eq!((out.as_str(), err.as_str()), ("hello, big world\n", ""));

    let (control, out, err) = session.run("explode");
    assert_eq!(control, Control::Continue);
    assert_eq!(out, "");
    assert_eq!(err, "explode: it went wrong\n");
}

#[test]
#[cfg(unix)]
fn external_program_with_both_redirects() {
    let tmp = tempfile::tempdir().unwrap();
    make_script(tmp.path(), "lister", "echo listed");
    let out_file = tmp.path().join("o.txt");
    let err_file = tmp.path().join("e.txt");
    let mut session = Session::with_path(&tmp.path().to_string_lossy());

    let (_, out, err) = session.run(&format!(
        "lister 2> {} > {}",
        quoted(&err_file),
        quoted(&out_file)
    ));

    assert_eq!((out.as_str(), err.as_str()), ("", ""));
    assert_eq!(fs::read_to_string(&out_file).unwrap(), "listed");
    assert!(!err_file.exists());
}

#[test]
#[cfg(unix)]
fn external_per_operand_utility_runs_per_argument() {
    let tmp = tempfile::tempdir().unwrap();
    // prints its single argument, fails when it is "bad"
    make_script(
        tmp.path(),
        "wc",
        r#"if [ "$#" -ne 1 ]; then echo "wc: expected one operand, got $#" >&2; exit 2; fi
if [ "$1" = bad ]; then echo "wc: bad: rejected" >&2; exit 1; fi
echo "counted $1""#,
    );
    let mut session = Session::with_path(&tmp.path().to_string_lossy());

    let (_, out, err) = session.run("wc a bad b");

    assert_eq!(out, "counted a\ncounted b\n");
    assert_eq!(err, "wc: bad: rejected\n");
}

// Custom builtins plug into a registry the same way the stock ones do.
#[derive(argh::FromArgs)]
/// Print the arguments in upper case.
struct Shout {
    #[argh(positional, greedy)]
    /// words to shout
    words: Vec<String>,
}

impl BuiltinCommand for Shout {
    fn name() -> &'static str {
        "shout"
    }

    fn execute(self, _env: &mut Environment, _registry: &Registry) -> Outcome {
        Outcome::single(CommandResult::success(format!(
            "{}\n",
            self.words.join(" ").to_uppercase()
        )))
    }
}

#[test]
fn custom_registry_dispatches_custom_builtin() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("shout.txt");
    let mut sh = Interpreter::new(
        Environment::default(),
        Registry::new().register::<Shout>(),
    );

    let mut out = Vec::new();
    let mut err = Vec::new();
    sh.run_line("shout 'hey you'", &mut out, &mut err).unwrap();
    assert_eq!(out, b"HEY YOU\n");

    sh.run_line(&format!("shout quiet > {}", quoted(&target)), &mut out, &mut err)
        .unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "QUIET");

    // echo is not registered here and there is no PATH
    out.clear();
    sh.run_line("echo hi", &mut out, &mut err).unwrap();
    assert!(out.is_empty());
    assert_eq!(err, b"echo: command not found\n");
}
