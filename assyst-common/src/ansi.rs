//! Terminal colouring for log lines.

macro_rules! ansi_methods {
    ($($name:ident => ($open:literal, $close:literal)),* $(,)?) => {
        pub trait Ansi {
            $(fn $name(&self) -> String;)*
        }

        impl Ansi for str {
            $(
                fn $name(&self) -> String {
                    format!(concat!("\x1b[", $open, "m{}\x1b[", $close, "m"), self)
                }
            )*
        }
    };
}

ansi_methods! {
    bold => ("1", "22"),
    fg_red => ("31", "39"),
    fg_green => ("32", "39"),
    fg_yellow => ("33", "39"),
    fg_blue => ("34", "39"),
    fg_cyan => ("36", "39"),
}
