// 声明模块结构：
// `application`: 应用启动逻辑。
// `handlers`: API 请求处理逻辑。
// `state`: 应用共享状态定义。
mod application;
mod handlers;
mod state;


use std::io;

// `#[actix_web::main]` 宏将异步 main 函数标记为 actix-web 程序的入口点。
#[actix_web::main]
async fn main() -> io::Result<()> {
    // 启动失败时打印错误并以非零状态码退出。
    if let Err(err) = application::run().await {
        eprintln!("[api] bootstrap failed: {err}");
        return Err(io::Error::other(err.to_string()));
    }

    Ok(())
}
