//! Executes a fully-assembled [`Command`] against a [`Cache`] and produces
//! a [`DispatchResult`] (§4.6). This is synchronous and never blocks — the
//! only suspension points in the whole system are the socket read/write
//! calls the connection task makes around it (§5).

use crate::clock::Clock;
use crate::engine::Cache;
use crate::error::EngineError;
use crate::protocol::{Command, CommandName, DispatchResult, StateCode};

pub fn dispatch<C: Clock>(cache: &mut Cache<C>, cmd: Command) -> DispatchResult {
    tracing::debug!(command = ?cmd.name, "dispatching command");
    match cmd.name {
        CommandName::Get => dispatch_get(cache, &cmd),
        CommandName::Set => dispatch_set(cache, &cmd),
        CommandName::Add => dispatch_stored_or_not(cache, &cmd, Cache::add),
        CommandName::Replace => dispatch_stored_or_not(cache, &cmd, Cache::replace),
        CommandName::Append => dispatch_concat(cache, &cmd, Cache::append),
        CommandName::Prepend => dispatch_concat(cache, &cmd, Cache::prepend),
        CommandName::Incr => dispatch_incr_decr(cache, &cmd, Cache::incr),
        CommandName::Decr => dispatch_incr_decr(cache, &cmd, Cache::decr),
        CommandName::Delete => dispatch_delete(cache, &cmd),
        CommandName::FlushAll => {
            cache.flush_all();
            DispatchResult::new(StateCode::Ok)
        }
        CommandName::Stats => dispatch_stats(cache),
    }
}

fn dispatch_get<C: Clock>(cache: &mut Cache<C>, cmd: &Command) -> DispatchResult {
    let key = &cmd.parameters[0];
    match cache.get(key) {
        Some(value) => {
            let mut data = format!("VALUE {} {} {}\r\n", key, 0, value.len()).into_bytes();
            data.extend_from_slice(&value);
            DispatchResult::with_data(StateCode::End, data)
        }
        None => DispatchResult::new(StateCode::End),
    }
}

fn dispatch_set<C: Clock>(cache: &mut Cache<C>, cmd: &Command) -> DispatchResult {
    let key = &cmd.parameters[0];
    let ttl = parse_ttl(&cmd.parameters[2]);
    let data = cmd.data.clone().unwrap_or_default();
    cache.set(key, data, ttl);
    DispatchResult::new(StateCode::Stored)
}

fn dispatch_stored_or_not<C: Clock>(
    cache: &mut Cache<C>,
    cmd: &Command,
    op: fn(&mut Cache<C>, &str, Vec<u8>, u32) -> bool,
) -> DispatchResult {
    let key = &cmd.parameters[0];
    let ttl = parse_ttl(&cmd.parameters[2]);
    let data = cmd.data.clone().unwrap_or_default();
    let stored = op(cache, key, data, ttl);
    DispatchResult::new(if stored {
        StateCode::Stored
    } else {
        StateCode::NotStored
    })
}

fn dispatch_concat<C: Clock>(
    cache: &mut Cache<C>,
    cmd: &Command,
    op: fn(&mut Cache<C>, &str, &[u8], u32) -> bool,
) -> DispatchResult {
    let key = &cmd.parameters[0];
    let ttl = parse_ttl(&cmd.parameters[2]);
    let data = cmd.data.clone().unwrap_or_default();
    let stored = op(cache, key, &data, ttl);
    DispatchResult::new(if stored {
        StateCode::Stored
    } else {
        StateCode::NotStored
    })
}

fn dispatch_incr_decr<C: Clock>(
    cache: &mut Cache<C>,
    cmd: &Command,
    op: fn(&mut Cache<C>, &str, u64) -> Result<Option<i64>, EngineError>,
) -> DispatchResult {
    let key = &cmd.parameters[0];
    let delta: u64 = cmd.parameters.get(1).and_then(|p| p.parse().ok()).unwrap_or(0);
    match op(cache, key, delta) {
        Ok(Some(new_value)) => DispatchResult::new(StateCode::Integer(new_value)),
        Ok(None) => DispatchResult::new(StateCode::NotFound),
        Err(err) => {
            tracing::warn!(reason = %err, "protocol error surfaced to client");
            DispatchResult::new(StateCode::ClientError(err.to_string()))
        }
    }
}

fn dispatch_delete<C: Clock>(cache: &mut Cache<C>, cmd: &Command) -> DispatchResult {
    let key = &cmd.parameters[0];
    if cache.delete(key) {
        DispatchResult::new(StateCode::Deleted)
    } else {
        DispatchResult::new(StateCode::NotFound)
    }
}

fn dispatch_stats<C: Clock>(cache: &Cache<C>) -> DispatchResult {
    let stats = cache.stats();
    let data = format!(
        "STAT cmd_get {}\r\nSTAT cmd_set {}\r\nSTAT get_hits {}\r\nSTAT get_misses {}",
        stats.cmd_get(),
        stats.sets(),
        stats.get_hits(),
        stats.get_misses()
    );
    DispatchResult::with_data(StateCode::Empty, data.into_bytes())
}

fn parse_ttl(raw: &str) -> u32 {
    raw.parse().unwrap_or(0)
}
