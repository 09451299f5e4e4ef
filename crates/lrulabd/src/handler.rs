//! Command handler for the RESP server

use crate::resp::RespValue;
use lrulab::SharedCache;
use std::sync::Arc;

const NOT_INTEGER: &str = "ERR value is not an integer or out of range";

pub struct CommandHandler {
    cache: Arc<SharedCache>,
}

impl CommandHandler {
    pub fn new(cache: Arc<SharedCache>) -> Self {
        Self { cache }
    }

    pub fn handle(&self, cmd: RespValue) -> RespValue {
        let arr = match cmd {
            RespValue::Array(Some(arr)) if !arr.is_empty() => arr,
            _ => return RespValue::error("ERR invalid command format"),
        };

        let command = match &arr[0] {
            RespValue::BulkString(Some(cmd)) => String::from_utf8_lossy(cmd).to_uppercase(),
            _ => return RespValue::error("ERR invalid command"),
        };
        let args = &arr[1..];

        match command.as_str() {
            "PING" => self.handle_ping(args),
            "ECHO" => self.handle_echo(args),
            "GET" => self.handle_get(args),
            "SET" | "PUT" => self.handle_put(&command, args),
            "EXISTS" => self.handle_exists(args),
            "DBSIZE" | "ORDER" | "DUMP" | "INFO" if !args.is_empty() => {
                wrong_arity(&command.to_lowercase())
            }
            "DBSIZE" => RespValue::Integer(self.cache.len() as i64),
            "ORDER" => self.handle_order(),
            "DUMP" => self.handle_dump(),
            "INFO" => self.handle_info(),
            // redis-cli probes this on connect
            "COMMAND" => RespValue::Array(Some(vec![])),
            _ => RespValue::error(format!("ERR unknown command '{}'", command)),
        }
    }

    fn handle_ping(&self, args: &[RespValue]) -> RespValue {
        match args {
            [] => RespValue::SimpleString("PONG".to_string()),
            [msg] => msg.clone(),
            _ => wrong_arity("ping"),
        }
    }

    fn handle_echo(&self, args: &[RespValue]) -> RespValue {
        match args {
            [msg] => msg.clone(),
            _ => wrong_arity("echo"),
        }
    }

    fn handle_get(&self, args: &[RespValue]) -> RespValue {
        let [key] = args else {
            return wrong_arity("get");
        };
        match parse_int(key) {
            Some(key) => RespValue::Integer(self.cache.get(key)),
            None => RespValue::error(NOT_INTEGER),
        }
    }

    fn handle_put(&self, command: &str, args: &[RespValue]) -> RespValue {
        let [key, value] = args else {
            return wrong_arity(&command.to_lowercase());
        };
        match (parse_int(key), parse_int(value)) {
            (Some(key), Some(value)) => {
                self.cache.put(key, value);
                RespValue::SimpleString("OK".to_string())
            }
            _ => RespValue::error(NOT_INTEGER),
        }
    }

    fn handle_exists(&self, args: &[RespValue]) -> RespValue {
        if args.is_empty() {
            return wrong_arity("exists");
        }

        let mut count = 0i64;
        for arg in args {
            match parse_int(arg) {
                Some(key) if self.cache.peek(key).is_some() => count += 1,
                Some(_) => {}
                None => return RespValue::error(NOT_INTEGER),
            }
        }
        RespValue::Integer(count)
    }

    fn handle_order(&self) -> RespValue {
        let entries = self
            .cache
            .describe()
            .into_iter()
            .map(|(key, value)| RespValue::bulk(format!("{}:{}", key, value)))
            .collect();
        RespValue::Array(Some(entries))
    }

    fn handle_dump(&self) -> RespValue {
        match serde_json::to_vec(&self.cache.snapshot()) {
            Ok(json) => RespValue::bulk(json),
            Err(e) => RespValue::error(format!("ERR {}", e)),
        }
    }

    fn handle_info(&self) -> RespValue {
        let stats = self.cache.stats();
        let info = format!(
            "# Server\r\n\
             lrulab_version:{}\r\n\
             \r\n\
             # Cache\r\n\
             cache_size:{}\r\n\
             cache_capacity:{}\r\n\
             cache_hits:{}\r\n\
             cache_misses:{}\r\n\
             cache_inserts:{}\r\n\
             cache_updates:{}\r\n\
             cache_evictions:{}\r\n\
             cache_hit_ratio:{:.2}\r\n",
            env!("CARGO_PKG_VERSION"),
            self.cache.len(),
            self.cache.capacity(),
            stats.hits(),
            stats.misses(),
            stats.inserts(),
            stats.updates(),
            stats.evictions(),
            stats.hit_ratio(),
        );
        RespValue::bulk(info)
    }
}

fn wrong_arity(command: &str) -> RespValue {
    RespValue::error(format!(
        "ERR wrong number of arguments for '{}' command",
        command
    ))
}

fn parse_int(arg: &RespValue) -> Option<i64> {
    match arg {
        RespValue::BulkString(Some(bytes)) => std::str::from_utf8(bytes).ok()?.parse().ok(),
        RespValue::Integer(i) => Some(*i),
        _ => None,
    }
}
