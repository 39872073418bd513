//! Two-step command state.
//!
//! Combine, rename, and alias are spoken in two halves: "combine velma …"
//! opens a prompt, and the next utterance completes it. This machine holds
//! the mode and target between the halves. Finishing is unconditional — the
//! state always clears, even when the second utterance is empty or no flow
//! was pending.

/// Which two-step flow is waiting for its second input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PendingCommand {
    /// Nothing pending.
    #[default]
    None,
    /// Waiting for the name to merge into the target as an alias.
    Combine(String),
    /// Waiting for the target's new name.
    Rename(String),
    /// Waiting for the target's new alias.
    Alias(String),
}

/// A completed two-step flow, ready to dispatch to an identity operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Combine { primary: String, secondary: String },
    Rename { name: String, new_name: String },
    AddAlias { name: String, alias: String },
}

/// Outcome of starting the alias flow, which tolerates being invoked again
/// while already prompting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasStart {
    /// A prompt should be shown for the named target.
    Prompted,
    /// A prompt was already up: the new name completes the pending flow.
    Completed(PendingAction),
}

/// Holds the transient two-step state between a command and its completion.
#[derive(Debug, Default)]
pub struct PendingState {
    pending: PendingCommand,
}

impl PendingState {
    /// Create an idle machine.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current mode and target.
    pub fn current(&self) -> &PendingCommand {
        &self.pending
    }

    /// Whether a second input is being waited for.
    pub fn is_pending(&self) -> bool {
        self.pending != PendingCommand::None
    }

    /// Begin the combine flow with `primary` as the merge target.
    pub fn start_combine(&mut self, primary: &str) {
        self.pending = PendingCommand::Combine(primary.to_string());
    }

    /// Begin the rename flow for `name`.
    pub fn start_rename(&mut self, name: &str) {
        self.pending = PendingCommand::Rename(name.to_string());
    }

    /// Begin the alias flow for `name`.
    ///
    /// Re-entrant by design: if an alias prompt is already up, the new name
    /// is treated as the alias and completes the pending flow instead of
    /// replacing it. Combine and rename do not get this shortcut.
    pub fn start_alias(&mut self, name: &str) -> AliasStart {
        if let PendingCommand::Alias(target) = &self.pending {
            let target = target.clone();
            log::debug!("Alias prompt already up, treating \"{name}\" as the alias for \"{target}\"");
            self.pending = PendingCommand::None;
            return AliasStart::Completed(PendingAction::AddAlias {
                name: target,
                alias: name.to_string(),
            });
        }
        self.pending = PendingCommand::Alias(name.to_string());
        AliasStart::Prompted
    }

    /// Cancel whatever is pending.
    pub fn cancel(&mut self) {
        self.pending = PendingCommand::None;
    }

    /// Complete the pending flow with the second spoken input.
    ///
    /// The input is normalized (sequences of words joined, whitespace
    /// trimmed). Returns the action to dispatch, or `None` when nothing was
    /// pending or the input was empty — in every case the pending state is
    /// cleared.
    pub fn finish<I, S>(&mut self, spoken: I) -> Option<PendingAction>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let spoken = spoken
            .into_iter()
            .map(|w| w.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();

        let mode = std::mem::take(&mut self.pending);
        if spoken.is_empty() {
            log::debug!("Pending finish with empty input, clearing state");
            return None;
        }
        match mode {
            PendingCommand::None => None,
            PendingCommand::Combine(primary) => Some(PendingAction::Combine {
                primary,
                secondary: spoken,
            }),
            PendingCommand::Rename(name) => Some(PendingAction::Rename {
                name,
                new_name: spoken,
            }),
            PendingCommand::Alias(name) => Some(PendingAction::AddAlias {
                name,
                alias: spoken,
            }),
        }
    }
}
