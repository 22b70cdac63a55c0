//! Screens drawn as ASCII, for unit tests

use std::collections::VecDeque;

use crate::action::Action;
use crate::consts::*;
use crate::env::{EnvError, Environment, StepInfo, Transition};
use crate::glyph::Glyph;
use crate::observation::Observation;
use crate::position::Position;

/// Glyph shown for the agent (a human)
pub(crate) const AGENT_GLYPH: Glyph = mon_to_glyph(328);

pub(crate) fn glyph_for(ch: char) -> Glyph {
    match ch {
        ' ' => cmap_to_glyph(S_STONE),
        '.' => cmap_to_glyph(S_ROOM),
        '#' => cmap_to_glyph(S_CORR),
        '|' => cmap_to_glyph(S_VWALL),
        '-' => cmap_to_glyph(S_HWALL),
        '+' => cmap_to_glyph(S_VCDOOR),
        '/' => cmap_to_glyph(S_VODOOR),
        '<' => cmap_to_glyph(S_UPSTAIR),
        '>' => cmap_to_glyph(S_DNSTAIR),
        '@' => AGENT_GLYPH,
        'P' => pet_to_glyph(16),
        'a'..='z' => mon_to_glyph(ch as Glyph - 'a' as Glyph),
        _ => panic!("no glyph for {ch:?}"),
    }
}

fn display_for(ch: char) -> u8 {
    match ch {
        '/' => b'-',
        'P' => b'd',
        other => other as u8,
    }
}

/// Observation whose top-left corner shows `rows`; everything else is stone
pub(crate) fn screen(rows: &[&str]) -> Observation {
    let mut obs = Observation::blank();
    obs.stats.level_number = 1;
    for (row, line) in rows.iter().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            let pos = Position::new(row as i16, col as i16);
            obs.glyphs[pos.index()] = glyph_for(ch);
            obs.chars[pos.index()] = display_for(ch);
            if ch == '@' {
                obs.stats.y = row as i64;
                obs.stats.x = col as i64;
            }
        }
    }
    obs
}

/// Replays canned replies and records every submitted action.
///
/// The episode ends when the replies run out.
pub(crate) struct ScriptedEnv {
    start: Observation,
    replies: VecDeque<Observation>,
    pub(crate) actions: Vec<Action>,
}

impl ScriptedEnv {
    pub(crate) fn new(start: Observation, replies: Vec<Observation>) -> Self {
        Self {
            start,
            replies: replies.into(),
            actions: Vec::new(),
        }
    }
}

impl Environment for ScriptedEnv {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        Ok(self.start.clone())
    }

    fn step(&mut self, action: Action) -> Result<Transition, EnvError> {
        self.actions.push(action);
        Ok(match self.replies.pop_front() {
            Some(observation) => Transition {
                observation,
                reward: 1.0,
                done: false,
                info: StepInfo::default(),
            },
            None => Transition {
                observation: Observation::blank(),
                reward: 0.0,
                done: true,
                info: StepInfo {
                    end_reason: Some("script exhausted".to_string()),
                    truncated: false,
                },
            },
        })
    }
}
