use crate::cert::{CertificateColumn, CertificateService};
use crate::cli::args::{Cli, CompletionCommands, CompletionHelperCommands};
use crate::storage::CertificateStore;
use crate::utils::errors::Result;
use crate::utils::output::OutputFormat;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io;

pub fn handle_completion_command(command: &CompletionCommands) -> Result<()> {
    let shell = command.shell();
    let mut cmd = Cli::command();
    let app_name = "cert-anchor";

    // For bash, add our custom completion enhancement first
    if matches!(shell, Shell::Bash) {
        println!("# Enhanced completion for cert-anchor certificate ids and columns");
        print!(
            r#"
_cert_anchor_complete_ids() {{
    local ids
    ids=$(cert-anchor completion-helper certificate-ids 2>/dev/null)
    COMPREPLY=($(compgen -W "$ids" -- "${{cur}}"))
}}

_cert_anchor_complete_columns() {{
    local columns
    columns=$(cert-anchor completion-helper columns 2>/dev/null)

    # Handle comma-separated values and + prefix
    local current_word="${{cur}}"
    local prefix=""

    if [[ "$current_word" == +* ]]; then
        prefix="+"
        current_word="${{current_word:1}}"
    fi

    if [[ "$current_word" == *,* ]]; then
        prefix="${{prefix}}${{current_word%,*}},"
        current_word="${{current_word##*,}}"
    fi

    local word_list=""
    for col in $columns; do
        if [[ "$col" == "$current_word"* ]]; then
            word_list="$word_list ${{prefix}}${{col}}"
        fi
    done

    COMPREPLY=($(compgen -W "$word_list" -- "${{cur}}"))
}}

# Override the generated completion for specific arguments
_cert_anchor_override() {{
    local cur prev words cword
    _init_completion || return

    case "$prev" in
        "verify"|"revoke"|"show")
            _cert_anchor_complete_ids
            return 0
            ;;
        "--columns")
            _cert_anchor_complete_columns
            return 0
            ;;
    esac

    # Fall back to the original completion
    _cert-anchor "$@"
}}

"#
        );

        // Generate the base completion
        generate(shell, &mut cmd, app_name, &mut io::stdout());

        println!();
        println!("# Override the completion function");
        println!("complete -F _cert_anchor_override cert-anchor");
    } else {
        // For non-bash shells, just generate the standard completion
        generate(shell, &mut cmd, app_name, &mut io::stdout());
    }

    Ok(())
}

pub fn handle_completion_helper_command<S: CertificateStore>(
    command: &CompletionHelperCommands,
    service: &CertificateService<S>,
    output: &OutputFormat,
) -> Result<()> {
    match command {
        CompletionHelperCommands::CertificateIds => {
            // Completion should never surface store errors
            if let Ok(certificates) = service.list_certificates() {
                let ids: Vec<String> = certificates
                    .iter()
                    .map(|c| c.certificate_id.to_string())
                    .collect();
                output.print_list(&ids);
            }
        }
        CompletionHelperCommands::Columns => {
            output.print_list(CertificateColumn::NAMES);
        }
    }

    Ok(())
}
