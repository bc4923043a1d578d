// Unit tests for command line planning
use lfs_ext::PipelineError;
use lfs_ext::pipeline::{Action, Extension, Invocation, plan_chain};

#[test]
fn test_plans_clean_commands_in_order() {
    let exts = vec![
        Extension::new("foo", "foo-clean --name %f", "foo-smudge %f", 0),
        Extension::new("bar", "bar-clean", "bar-smudge", 1),
    ];

    let plan = plan_chain(Action::Clean, "docs/a.bin", &exts).unwrap();
    assert_eq!(
        plan,
        vec![
            Invocation {
                name: "foo".to_string(),
                program: "foo-clean".to_string(),
                args: vec!["--name".to_string(), "docs/a.bin".to_string()],
            },
            Invocation {
                name: "bar".to_string(),
                program: "bar-clean".to_string(),
                args: Vec::new(),
            },
        ]
    );
}

#[test]
fn test_plans_smudge_commands() {
    let exts = vec![Extension::new("foo", "foo-clean %f", "foo-smudge %f", 0)];

    let plan = plan_chain(Action::Smudge, "a.txt", &exts).unwrap();
    assert_eq!(plan[0].program, "foo-smudge");
    assert_eq!(plan[0].args, vec!["a.txt"]);
}

#[test]
fn test_substitutes_every_token() {
    let exts = vec![Extension::new(
        "foo",
        "tool --in=%f --out=%f.out %f%f",
        "tool",
        0,
    )];

    let plan = plan_chain(Action::Clean, "x", &exts).unwrap();
    assert_eq!(plan[0].args, vec!["--in=x", "--out=x.out", "xx"]);
}

#[test]
fn test_program_is_not_substituted() {
    let exts = vec![Extension::new("foo", "%f-tool %f", "tool", 0)];

    let plan = plan_chain(Action::Clean, "x", &exts).unwrap();
    assert_eq!(plan[0].program, "%f-tool");
}

#[test]
fn test_extra_whitespace_is_collapsed() {
    let exts = vec![Extension::new("foo", "  tool   -a\t-b  ", "tool", 0)];

    let plan = plan_chain(Action::Clean, "x", &exts).unwrap();
    assert_eq!(plan[0].program, "tool");
    assert_eq!(plan[0].args, vec!["-a", "-b"]);
}

#[test]
fn test_empty_command_is_rejected() {
    let exts = vec![Extension::new("blank", "   ", "tool", 0)];

    let err = plan_chain(Action::Clean, "x", &exts).unwrap_err();
    assert!(matches!(err, PipelineError::ConfigurationError(_)));
    assert!(err.to_string().contains("blank"));
}

#[test]
fn test_unsupported_action_text() {
    let err = "encrypt".parse::<Action>().unwrap_err();
    assert!(matches!(err, PipelineError::InvalidAction(_)));
}

#[test]
fn test_empty_extension_list() {
    assert!(plan_chain(Action::Clean, "x", &[]).unwrap().is_empty());
}
