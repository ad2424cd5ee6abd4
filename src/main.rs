// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # LittleHTTP
//!
//! 由 inetd 一类的进程级监管程序为每个连接启动一次：
//! 从标准输入读取一个 HTTP 请求，把响应写到标准输出，然后退出。
//!
//! 用法：`littlehttp <docroot>`
//!
//! 标准输出承载 HTTP 响应，因此日志一律写到标准错误。

use littlehttp::{Config, Dispatcher};

use log::{debug, error, info, LevelFilter};
use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{Appender, Config as LogConfig, Root},
    encode::pattern::PatternEncoder,
};
use tokio::{io::BufReader, runtime::Builder};

use std::{env, fs, process};

const LOG_CONFIG: &str = "config/log4rs.yaml";
const DEFAULT_CONFIG: &str = "config/littlehttp.toml";

fn main() {
    // 1. 日志系统：优先使用 YAML 配置，缺失时退回到写标准错误的内置配置
    init_logging();

    // 2. 参数与文档根目录检查
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        let program = args.first().map(String::as_str).unwrap_or("littlehttp");
        eprintln!("Usage: {} <docroot>", program);
        process::exit(1);
    }
    let docroot = args[1].clone();
    check_doc_root(&docroot);

    // 3. 运行参数
    let config_path = env::var("LITTLEHTTP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG.to_string());
    let config = Config::from_toml(&config_path);
    debug!("配置文件已载入：{:?}", config);

    // 4. 单个请求只需要当前线程运行时
    let runtime = match Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!("无法创建异步运行时：{}", e);
            process::exit(1);
        }
    };

    let id = u128::from(process::id());
    let dispatcher = Dispatcher::new(docroot, config, id);

    let result = runtime.block_on(async {
        let mut input = BufReader::new(tokio::io::stdin());
        let mut output = tokio::io::stdout();
        dispatcher.serve(&mut input, &mut output).await
    });

    match result {
        Ok(status) => info!("[ID{}]事务完成：{}", id, status),
        Err(e) => {
            error!("[ID{}]{}", id, e);
            process::exit(1);
        }
    }
}

fn init_logging() {
    if log4rs::init_file(LOG_CONFIG, Default::default()).is_ok() {
        return;
    }

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}",
        )))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Info));
    match config {
        Ok(c) => {
            if let Err(e) = log4rs::init_config(c) {
                eprintln!("无法初始化日志系统：{}", e);
            }
        }
        Err(e) => eprintln!("日志配置无效：{}", e),
    }
}

/// 文档根目录必须存在且是目录
fn check_doc_root(path: &str) {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => info!("www root: {}", path),
        Ok(_) => {
            error!("{} 不是文档根目录", path);
            process::exit(1);
        }
        Err(e) => {
            error!("无法访问文档根目录{}：{}", path, e);
            process::exit(1);
        }
    }
}
