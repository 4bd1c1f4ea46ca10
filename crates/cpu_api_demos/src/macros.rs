#[macro_export]
macro_rules! message {
    ($($msg:tt)*) => {
        {
            let prog = $crate::arg0();
            ::std::eprintln!("{prog}: {msg}", msg = ::core::format_args!($($msg)*));
        }
    }
}

#[macro_export]
macro_rules! message_err {
    ($e:expr) => {
        {
            let prog = $crate::arg0();
            ::std::eprintln!("{prog}: {e}", e = $e);
        }
    };
    ($e:expr, $($msg:tt)*) => {
        {
            let prog = $crate::arg0();
            ::std::eprintln!("{prog}: {msg}: {e}", msg = ::core::format_args!($($msg)*), e = $e);
        }
    };
}

#[macro_export]
macro_rules! exit {
    ($($msg:tt)*) => {
        {
            $crate::message!($($msg)*);
            ::cpu_api_lib::process::exit(1);
        }
    }
}

#[macro_export]
macro_rules! exit_err {
    ($e:expr, $($msg:tt)*) => {
        {
            $crate::message_err!($e, $($msg)*);
            ::cpu_api_lib::process::exit(1);
        }
    }
}

#[macro_export]
macro_rules! usage_and_exit {
    ($($args:tt)*) => {
        {
            let prog = $crate::arg0();
            ::std::eprintln!("Usage: {prog} {args}", args = ::core::format_args!($($args)*));
            ::cpu_api_lib::process::exit(1);
        }
    };
}
