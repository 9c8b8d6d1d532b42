use expect_test::{Expect, expect};
use ferrotex_funceval::pipeline::INTRINSICS;
use ferrotex_funceval::{ErrorKind, translate};

fn check(latex: &str, expect: Expect) {
    let result = translate(latex);
    expect.assert_eq(&format!("{}\n", result.summary()));
}

#[test]
fn test_gaussian_normalisation() {
    check(
        r"\frac{1}{a_0\sqrt{2\pi}}",
        expect![[r#"
            ========= Parsing result =========
                 Latex input: \frac{1}{a_0\sqrt{2\pi}}
            Infix expression: ((1)/(a0*DSQRT(2*pi)))
                  Parameters: a_0
            ==================================
        "#]],
    );
}

#[test]
fn test_full_gaussian() {
    check(
        r"\frac{1}{a_0\sqrt{2\pi}}\exp(-\frac{1}{2}(\frac{x-x_0}{s})^2)",
        expect![[r#"
            ========= Parsing result =========
                 Latex input: \frac{1}{a_0\sqrt{2\pi}}\exp(-\frac{1}{2}(\frac{x-x_0}{s})^2)
            Infix expression: ((1)/(a0*DSQRT(2*pi)))*DEXP(-((1)/(2))*(((x-x0)/(s)))**2)
                  Parameters: a_0, x_0, s
            ==================================
        "#]],
    );
}

#[test]
fn test_mixed_calls_and_nested_fractions() {
    check(
        r"a_0x + \frac{a_1a_2\texttt{gauss_x}(-x^2)}{a_3} + 2^\frac{b_0 - \log(b_1x)}{2\pi\sqrt{c_0x}+c_1}",
        expect![[r#"
            ========= Parsing result =========
                 Latex input: a_0x + \frac{a_1a_2\texttt{gauss_x}(-x^2)}{a_3} + 2^\frac{b_0 - \log(b_1x)}{2\pi\sqrt{c_0x}+c_1}
            Infix expression: a0*x+((a1*a2*gauss_x(-x**2))/(a3))+2**((b0-DLOG(b1*x))/(2*pi*DSQRT(c0*x)+c1))
                  Parameters: a_0, a_1, a_2, a_3, b_0, b_1, c_0, c_1
                   Functions: gauss_x/1
            ==================================
        "#]],
    );
}

#[test]
fn test_subscripted_variable_names() {
    let result = translate("2.34^x_dx_1");
    expect![["2.34**xd*x1"]].assert_eq(&result.infix);
    let names: Vec<&str> = result.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["x_d", "x_1"]);
}

#[test]
fn test_nested_fraction_is_recursive() {
    let result = translate(r"\frac{\frac{a}{b}}{c}");
    expect![["((((a)/(b)))/(c))"]].assert_eq(&result.infix);
    assert_eq!(result.status, ErrorKind::None);
}

#[test]
fn test_intrinsic_inside_fraction() {
    let result = translate(r"\frac{\sin(x)}{\cos{x}}");
    expect![["((DSIN(x))/(DCOS(x)))"]].assert_eq(&result.infix);
    assert!(result.parameters.is_empty());
}

#[test]
fn test_unsupported_construct_reports_status() {
    let result = translate(r"\frac{1}{\Gamma(x)}");
    assert_eq!(result.status, ErrorKind::UnknownParameter);
    assert!(result.infix.contains('\\'));
}

/// Parentheses in the output always pair up once intrinsic names are removed.
#[test]
fn test_output_parentheses_balanced() {
    let inputs = [
        r"\frac{1}{a_0\sqrt{2\pi}}",
        r"\frac{\frac{a}{b}}{\frac{c}{d}}",
        r"\exp(-\frac{1}{2}(\frac{x-x_0}{s})^2)",
        r"\texttt{f}(\texttt{g}(x), \sqrt{x}) + 2(x)(a)",
        r"a_1\sin{b_1\cos(c_1\tan(x))}\log(\exp{x})",
    ];

    for latex in inputs {
        let result = translate(latex);
        assert_eq!(result.status, ErrorKind::None, "{}", latex);

        let mut stripped = result.infix.clone();
        for intrinsic in INTRINSICS {
            stripped = stripped.replace(intrinsic.fortran, "");
        }
        let mut depth = 0i32;
        for c in stripped.chars() {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
            assert!(depth >= 0, "closing before opening in {}", result.infix);
        }
        assert_eq!(depth, 0, "unbalanced output {}", result.infix);
    }
}
